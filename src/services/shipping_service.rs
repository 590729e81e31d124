use crate::{
    dto::shipping::{ShippingQuoteRequest, ShippingResult},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    pricing::{Cart, Coordinates, ShippingQuote},
    response::{ApiResponse, Meta},
    services::cart_service,
    state::AppState,
};

/// Turns optional request coordinates into a destination. Both halves must
/// be present together.
pub fn destination_from(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> AppResult<Option<Coordinates>> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(latitude), Some(longitude)) => {
            let point = Coordinates::new(latitude, longitude);
            if !point.is_valid() {
                return Err(AppError::BadRequest(
                    "latitude/longitude out of range".into(),
                ));
            }
            Ok(Some(point))
        }
        _ => Err(AppError::BadRequest(
            "latitude and longitude must be given together".into(),
        )),
    }
}

/// Prices delivery of `cart` from the store. Without a destination the
/// distance is skipped and the flat fallback fee is charged unless the
/// cart reaches the free-shipping threshold.
pub fn quote_for(state: &AppState, destination: Option<Coordinates>, cart: &Cart) -> ShippingQuote {
    match destination {
        Some(destination) => state
            .shipping
            .calculate_fee(state.store_location, destination, cart),
        None => {
            tracing::debug!("no delivery coordinates, charging fallback fee");
            state.shipping.fallback_quote(cart)
        }
    }
}

pub async fn quote_shipping(
    state: &AppState,
    user: &AuthUser,
    payload: ShippingQuoteRequest,
) -> AppResult<ApiResponse<ShippingResult>> {
    let destination = destination_from(payload.latitude, payload.longitude)?;
    let cart = cart_service::load_cart(&state.orm, user.user_id).await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let quote = quote_for(state, destination, &cart);
    Ok(ApiResponse::success(
        "Shipping quote",
        ShippingResult::from(quote),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_come_in_pairs() {
        assert!(matches!(destination_from(None, None), Ok(None)));
        assert!(destination_from(Some(1.0), None).is_err());
        assert!(destination_from(None, Some(1.0)).is_err());
        assert!(destination_from(Some(120.0), Some(1.0)).is_err());
        assert_eq!(
            destination_from(Some(-7.25), Some(112.75)).ok().flatten(),
            Some(Coordinates::new(-7.25, 112.75))
        );
    }
}
