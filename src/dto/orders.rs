use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderItem};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub address: Option<String>,
    pub payment_method: String,
    /// Delivery point. Without both coordinates a flat fee applies below the
    /// free-shipping threshold.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub voucher_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub is_free_shipping: bool,
    /// Outcome of the supplied voucher code, if any. A rejected voucher
    /// leaves the order at full price.
    pub voucher_message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
