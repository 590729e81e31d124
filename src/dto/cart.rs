use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartList {
    pub items: Vec<CartItemDto>,
    pub subtotal: Decimal,
    pub total_items: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemDto {
    pub product_id: Uuid,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}
