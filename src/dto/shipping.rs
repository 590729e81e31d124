use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::pricing::ShippingQuote;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ShippingQuoteRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShippingResult {
    pub shipping_fee: Decimal,
    pub distance_km: Decimal,
    pub is_free_shipping: bool,
}

impl From<ShippingQuote> for ShippingResult {
    fn from(quote: ShippingQuote) -> Self {
        Self {
            shipping_fee: quote.shipping_fee,
            distance_km: quote.distance_km,
            is_free_shipping: quote.is_free_shipping,
        }
    }
}
