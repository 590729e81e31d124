use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{cart_items, order_items, orders, products, voucher_usages, vouchers};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub unit: String,
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            category: model.category,
            unit: model.unit,
            price: model.price,
            stock: model.stock,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            user_id: model.user_id,
            quantity: model.quantity,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub shipping_fee: Decimal,
    pub total_amount: Decimal,
    pub voucher_id: Option<Uuid>,
    pub voucher_code: Option<String>,
    pub shipping_address: Option<String>,
    pub distance_km: Option<Decimal>,
    pub payment_method: String,
    pub status: String,
    pub invoice_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            subtotal: model.subtotal,
            discount_amount: model.discount_amount,
            shipping_fee: model.shipping_fee,
            total_amount: model.total_amount,
            voucher_id: model.voucher_id,
            voucher_code: model.voucher_code,
            shipping_address: model.shipping_address,
            distance_km: model.distance_km,
            payment_method: model.payment_method,
            status: model.status,
            invoice_number: model.invoice_number,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub category: String,
    pub unit: String,
    pub quantity: i32,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            product_name: model.product_name,
            category: model.category,
            unit: model.unit,
            quantity: model.quantity,
            price: model.price,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Voucher {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub voucher_type: String,
    pub discount_value: Decimal,
    pub minimum_order_amount: Option<Decimal>,
    pub maximum_discount: Option<Decimal>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub usage_limit: i32,
    pub used_count: i32,
    pub is_active: bool,
    pub applicability: String,
    pub applicable_category: Option<String>,
    pub applicable_product_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<vouchers::Model> for Voucher {
    fn from(model: vouchers::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            description: model.description,
            voucher_type: model.voucher_type,
            discount_value: model.discount_value,
            minimum_order_amount: model.minimum_order_amount,
            maximum_discount: model.maximum_discount,
            valid_from: model.valid_from.with_timezone(&Utc),
            valid_to: model.valid_to.with_timezone(&Utc),
            usage_limit: model.usage_limit,
            used_count: model.used_count,
            is_active: model.is_active,
            applicability: model.applicability,
            applicable_category: model.applicable_category,
            applicable_product_id: model.applicable_product_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VoucherUsage {
    pub id: Uuid,
    pub voucher_id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub discount_amount: Decimal,
    pub total_before: Decimal,
    pub total_after: Decimal,
    pub used_at: DateTime<Utc>,
}

impl From<voucher_usages::Model> for VoucherUsage {
    fn from(model: voucher_usages::Model) -> Self {
        Self {
            id: model.id,
            voucher_id: model.voucher_id,
            order_id: model.order_id,
            user_id: model.user_id,
            discount_amount: model.discount_amount,
            total_before: model.total_before,
            total_after: model.total_after,
            used_at: model.used_at.with_timezone(&Utc),
        }
    }
}
