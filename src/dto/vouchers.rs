use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Voucher, VoucherUsage},
    pricing::VoucherType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApplicabilityKind {
    AllProducts,
    SpecificCategory,
    SpecificProduct,
    MinimumOrderOnly,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVoucherRequest {
    /// Generated when omitted.
    pub code: Option<String>,
    #[serde(default)]
    pub description: String,
    pub voucher_type: VoucherType,
    pub discount_value: Decimal,
    pub minimum_order_amount: Option<Decimal>,
    pub maximum_discount: Option<Decimal>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    /// 0 or omitted means unlimited.
    pub usage_limit: Option<i32>,
    pub applicability: ApplicabilityKind,
    pub applicable_category: Option<String>,
    pub applicable_product_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVoucherStatusRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateVoucherRequest {
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateVoucherResult {
    pub success: bool,
    pub message: String,
    pub discount_amount: Option<Decimal>,
    pub new_total: Option<Decimal>,
    pub voucher_type: Option<String>,
    pub voucher_description: Option<String>,
}

impl ValidateVoucherResult {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            discount_amount: None,
            new_total: None,
            voucher_type: None,
            voucher_description: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VoucherList {
    pub items: Vec<Voucher>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VoucherUsageList {
    pub items: Vec<VoucherUsage>,
}
