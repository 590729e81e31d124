use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::vouchers::{
        CreateVoucherRequest, UpdateVoucherStatusRequest, ValidateVoucherRequest,
        ValidateVoucherResult, VoucherList, VoucherUsageList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Voucher,
    response::ApiResponse,
    routes::params::{Pagination, VoucherListQuery},
    services::voucher_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vouchers).post(create_voucher))
        .route("/validate", post(validate_voucher))
        .route("/{id}", get(get_voucher))
        .route("/{id}/status", patch(update_voucher_status))
        .route("/{id}/usages", get(list_voucher_usages))
}

#[utoipa::path(
    post,
    path = "/api/vouchers/validate",
    request_body = ValidateVoucherRequest,
    responses(
        (status = 200, description = "Outcome of the code against the current cart; the voucher is not consumed", body = ApiResponse<ValidateVoucherResult>)
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn validate_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ValidateVoucherRequest>,
) -> AppResult<Json<ApiResponse<ValidateVoucherResult>>> {
    let resp = voucher_service::validate_voucher(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vouchers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag")
    ),
    responses(
        (status = 200, description = "All vouchers (admin only)", body = ApiResponse<VoucherList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn list_vouchers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<VoucherListQuery>,
) -> AppResult<Json<ApiResponse<VoucherList>>> {
    let resp = voucher_service::list_vouchers(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/vouchers",
    request_body = CreateVoucherRequest,
    responses(
        (status = 200, description = "Voucher created", body = ApiResponse<Voucher>),
        (status = 400, description = "Invalid voucher or duplicate code"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn create_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateVoucherRequest>,
) -> AppResult<Json<ApiResponse<Voucher>>> {
    let resp = voucher_service::create_voucher(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vouchers/{id}",
    params(
        ("id" = Uuid, Path, description = "Voucher ID")
    ),
    responses(
        (status = 200, description = "Voucher", body = ApiResponse<Voucher>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn get_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Voucher>>> {
    let resp = voucher_service::get_voucher(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/vouchers/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Voucher ID")
    ),
    request_body = UpdateVoucherStatusRequest,
    responses(
        (status = 200, description = "Voucher activated or deactivated", body = ApiResponse<Voucher>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn update_voucher_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVoucherStatusRequest>,
) -> AppResult<Json<ApiResponse<Voucher>>> {
    let resp = voucher_service::set_voucher_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vouchers/{id}/usages",
    params(
        ("id" = Uuid, Path, description = "Voucher ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Orders that used the voucher", body = ApiResponse<VoucherUsageList>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn list_voucher_usages(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<VoucherUsageList>>> {
    let resp = voucher_service::list_voucher_usages(&state, &user, id, pagination).await?;
    Ok(Json(resp))
}
