use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::shipping::{ShippingQuoteRequest, ShippingResult},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::shipping_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/quote", post(quote_shipping))
}

#[utoipa::path(
    post,
    path = "/api/shipping/quote",
    request_body = ShippingQuoteRequest,
    responses(
        (status = 200, description = "Delivery fee for the current cart", body = ApiResponse<ShippingResult>),
        (status = 400, description = "Empty cart or bad coordinates"),
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn quote_shipping(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ShippingQuoteRequest>,
) -> AppResult<Json<ApiResponse<ShippingResult>>> {
    let resp = shipping_service::quote_shipping(&state, &user, payload).await?;
    Ok(Json(resp))
}
