//! Voucher validation and discount calculation.
//!
//! Lookup and the usage counter live in `services::voucher_service`; this
//! module only decides whether a loaded voucher applies to a cart and how
//! much it takes off.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{cart::Cart, money::round_money};

pub const CODE_LENGTH: usize = 8;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VoucherType {
    FixedAmount,
    Percentage,
}

impl VoucherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherType::FixedAmount => "fixed_amount",
            VoucherType::Percentage => "percentage",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fixed_amount" => Some(VoucherType::FixedAmount),
            "percentage" => Some(VoucherType::Percentage),
            _ => None,
        }
    }
}

/// Which cart contents a voucher may discount.
///
/// The target of a category or product voucher travels with the variant, so
/// a voucher cannot carry a target its applicability does not use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applicability {
    AllProducts,
    SpecificCategory(String),
    SpecificProduct(Uuid),
    MinimumOrderOnly,
    /// A stored kind this build does not know. Treated as applicable.
    Unrecognized(String),
}

impl Applicability {
    pub const ALL_PRODUCTS: &'static str = "all_products";
    pub const SPECIFIC_CATEGORY: &'static str = "specific_category";
    pub const SPECIFIC_PRODUCT: &'static str = "specific_product";
    pub const MINIMUM_ORDER_ONLY: &'static str = "minimum_order_only";

    pub fn kind(&self) -> &str {
        match self {
            Applicability::AllProducts => Self::ALL_PRODUCTS,
            Applicability::SpecificCategory(_) => Self::SPECIFIC_CATEGORY,
            Applicability::SpecificProduct(_) => Self::SPECIFIC_PRODUCT,
            Applicability::MinimumOrderOnly => Self::MINIMUM_ORDER_ONLY,
            Applicability::Unrecognized(kind) => kind,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            Applicability::SpecificCategory(category) => Some(category),
            _ => None,
        }
    }

    pub fn product_id(&self) -> Option<Uuid> {
        match self {
            Applicability::SpecificProduct(id) => Some(*id),
            _ => None,
        }
    }

    /// Rebuilds the rule from its stored columns.
    pub fn from_parts(
        kind: &str,
        category: Option<String>,
        product_id: Option<Uuid>,
    ) -> Result<Self, String> {
        match kind {
            Self::ALL_PRODUCTS => Ok(Applicability::AllProducts),
            Self::MINIMUM_ORDER_ONLY => Ok(Applicability::MinimumOrderOnly),
            Self::SPECIFIC_CATEGORY => category
                .filter(|c| !c.is_empty())
                .map(Applicability::SpecificCategory)
                .ok_or_else(|| "specific_category voucher has no category".to_string()),
            Self::SPECIFIC_PRODUCT => product_id
                .map(Applicability::SpecificProduct)
                .ok_or_else(|| "specific_product voucher has no product".to_string()),
            other => Ok(Applicability::Unrecognized(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Voucher {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub voucher_type: VoucherType,
    pub discount_value: Decimal,
    pub minimum_order_amount: Option<Decimal>,
    pub maximum_discount: Option<Decimal>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    /// Zero means unlimited.
    pub usage_limit: i32,
    pub used_count: i32,
    pub is_active: bool,
    pub applicability: Applicability,
}

impl Voucher {
    pub fn has_uses_left(&self) -> bool {
        self.usage_limit == 0 || self.used_count < self.usage_limit
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.valid_from <= now && now <= self.valid_to && self.has_uses_left()
    }

    /// Records one use in memory. Persisted usage goes through
    /// `voucher_service::apply_usage`.
    pub fn apply_usage(&mut self) {
        self.used_count += 1;
    }
}

/// Why a voucher was turned down. The message is shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("No voucher code provided")]
    NoCode,
    #[error("Invalid voucher code")]
    InvalidCode,
    #[error("Voucher has expired or reached its usage limit")]
    ExpiredOrExhausted,
    #[error("Minimum order of {required} required for this voucher")]
    MinimumOrderNotMet { required: Decimal },
    #[error("Voucher is not applicable to the items in your cart")]
    NotApplicable,
    #[error("Cart is empty")]
    EmptyCart,
}

/// Trims and upper-cases a code for lookup.
pub fn normalize_code(raw: &str) -> Result<String, Rejection> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(Rejection::NoCode);
    }
    Ok(code.to_uppercase())
}

/// Checks a looked-up voucher against the cart. `None` means no active
/// voucher carries the code.
pub fn validate<'a>(
    voucher: Option<&'a Voucher>,
    cart: &Cart,
    now: DateTime<Utc>,
) -> Result<&'a Voucher, Rejection> {
    let voucher = voucher.ok_or(Rejection::InvalidCode)?;

    if !voucher.is_valid(now) {
        return Err(Rejection::ExpiredOrExhausted);
    }

    if let Some(required) = voucher.minimum_order_amount {
        if cart.total() < required {
            return Err(Rejection::MinimumOrderNotMet { required });
        }
    }

    if !is_applicable(voucher, cart) {
        return Err(Rejection::NotApplicable);
    }

    Ok(voucher)
}

pub fn is_applicable(voucher: &Voucher, cart: &Cart) -> bool {
    match &voucher.applicability {
        Applicability::AllProducts => true,
        // minimum already checked by `validate`
        Applicability::MinimumOrderOnly => true,
        Applicability::SpecificCategory(category) => cart.has_category(category),
        Applicability::SpecificProduct(product_id) => cart.has_product(*product_id),
        Applicability::Unrecognized(_) => true,
    }
}

/// Discount for `cart_total`, always within `[0, cart_total]`.
pub fn calculate_discount(voucher: &Voucher, cart_total: Decimal) -> Decimal {
    let cart_total = cart_total.max(Decimal::ZERO);
    let discount = match voucher.voucher_type {
        VoucherType::FixedAmount => voucher.discount_value,
        VoucherType::Percentage => {
            let discount = cart_total * voucher.discount_value / Decimal::ONE_HUNDRED;
            match voucher.maximum_discount {
                Some(cap) => discount.min(cap),
                None => discount,
            }
        }
    };
    round_money(discount.min(cart_total).max(Decimal::ZERO))
}

pub fn discounted_total(cart_total: Decimal, discount: Decimal) -> Decimal {
    round_money((cart_total - discount).max(Decimal::ZERO))
}

/// Eight characters drawn uniformly from `[A-Z0-9]`. Uniqueness against
/// stored codes is the caller's job.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::cart::CartLine;
    use chrono::Duration;
    use rand::{SeedableRng, rngs::StdRng};

    fn voucher(voucher_type: VoucherType, value: i64) -> Voucher {
        let now = Utc::now();
        Voucher {
            id: Uuid::new_v4(),
            code: "TEST".into(),
            description: "test voucher".into(),
            voucher_type,
            discount_value: Decimal::from(value),
            minimum_order_amount: None,
            maximum_discount: None,
            valid_from: now - Duration::days(1),
            valid_to: now + Duration::days(1),
            usage_limit: 0,
            used_count: 0,
            is_active: true,
            applicability: Applicability::AllProducts,
        }
    }

    fn cart_of(category: &str, product_id: Uuid, price: i64) -> Cart {
        Cart::new(vec![CartLine {
            product_id,
            category: category.into(),
            quantity: 1,
            price_per_unit: Decimal::from(price),
            unit: "pcs".into(),
        }])
    }

    #[test]
    fn normalize_rejects_blank_and_uppercases() {
        assert_eq!(normalize_code("   "), Err(Rejection::NoCode));
        assert_eq!(normalize_code(" save10 ").as_deref(), Ok("SAVE10"));
    }

    #[test]
    fn unknown_code_is_invalid() {
        let cart = cart_of("eggs", Uuid::new_v4(), 10);
        assert_eq!(validate(None, &cart, Utc::now()), Err(Rejection::InvalidCode));
    }

    #[test]
    fn validity_window_is_inclusive() {
        let v = voucher(VoucherType::Percentage, 10);
        assert!(v.is_valid(v.valid_from));
        assert!(v.is_valid(v.valid_to));
        assert!(!v.is_valid(v.valid_to + Duration::seconds(1)));
        assert!(!v.is_valid(v.valid_from - Duration::seconds(1)));
    }

    #[test]
    fn inactive_voucher_is_not_valid() {
        let mut v = voucher(VoucherType::Percentage, 10);
        v.is_active = false;
        assert!(!v.is_valid(Utc::now()));
    }

    #[test]
    fn expiry_is_checked_before_minimum() {
        let mut v = voucher(VoucherType::FixedAmount, 5);
        v.valid_to = Utc::now() - Duration::hours(1);
        v.minimum_order_amount = Some(Decimal::from(1000));
        let cart = cart_of("eggs", Uuid::new_v4(), 10);
        assert_eq!(
            validate(Some(&v), &cart, Utc::now()),
            Err(Rejection::ExpiredOrExhausted)
        );
    }

    #[test]
    fn minimum_order_reports_required_amount() {
        let mut v = voucher(VoucherType::FixedAmount, 5);
        v.minimum_order_amount = Some(Decimal::from(100));
        let cart = cart_of("eggs", Uuid::new_v4(), 99);
        let rejection = validate(Some(&v), &cart, Utc::now()).unwrap_err();
        assert_eq!(
            rejection,
            Rejection::MinimumOrderNotMet {
                required: Decimal::from(100)
            }
        );
        assert!(rejection.to_string().contains("100"));
    }

    #[test]
    fn category_and_product_applicability() {
        let product_id = Uuid::new_v4();
        let cart = cart_of("dairy", product_id, 20);

        let mut v = voucher(VoucherType::Percentage, 10);
        v.applicability = Applicability::SpecificCategory("dairy".into());
        assert!(is_applicable(&v, &cart));
        v.applicability = Applicability::SpecificCategory("Dairy".into());
        assert!(!is_applicable(&v, &cart));

        v.applicability = Applicability::SpecificProduct(product_id);
        assert!(is_applicable(&v, &cart));
        v.applicability = Applicability::SpecificProduct(Uuid::new_v4());
        assert_eq!(
            validate(Some(&v), &cart, Utc::now()),
            Err(Rejection::NotApplicable)
        );
    }

    #[test]
    fn unrecognized_applicability_is_permissive() {
        let mut v = voucher(VoucherType::Percentage, 10);
        v.applicability = Applicability::Unrecognized("seasonal".into());
        assert!(is_applicable(&v, &cart_of("eggs", Uuid::new_v4(), 1)));
    }

    #[test]
    fn from_parts_requires_targets() {
        assert!(Applicability::from_parts("specific_category", None, None).is_err());
        assert!(Applicability::from_parts("specific_product", None, None).is_err());
        assert_eq!(
            Applicability::from_parts("specific_category", Some("grain".into()), None),
            Ok(Applicability::SpecificCategory("grain".into()))
        );
        assert_eq!(
            Applicability::from_parts("bundle", None, None),
            Ok(Applicability::Unrecognized("bundle".into()))
        );
    }

    #[test]
    fn percentage_discount_rounds_half_away_from_zero() {
        let v = voucher(VoucherType::Percentage, 15);
        // 15% of 0.30 = 0.045
        assert_eq!(
            calculate_discount(&v, Decimal::new(30, 2)),
            Decimal::new(5, 2)
        );
    }

    #[test]
    fn discount_never_exceeds_total() {
        for value in [1, 50, 99, 100] {
            let v = voucher(VoucherType::Percentage, value);
            let d = calculate_discount(&v, Decimal::from(40));
            assert!(d >= Decimal::ZERO && d <= Decimal::from(40));
        }
        let v = voucher(VoucherType::FixedAmount, 500);
        assert_eq!(calculate_discount(&v, Decimal::from(12)), Decimal::from(12));
        assert_eq!(calculate_discount(&v, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn usage_limit_is_exhausted_after_n_uses() {
        let mut v = voucher(VoucherType::FixedAmount, 5);
        v.usage_limit = 3;
        let cart = cart_of("eggs", Uuid::new_v4(), 50);
        let now = Utc::now();
        for _ in 0..3 {
            assert!(validate(Some(&v), &cart, now).is_ok());
            v.apply_usage();
        }
        assert_eq!(
            validate(Some(&v), &cart, now),
            Err(Rejection::ExpiredOrExhausted)
        );
    }

    #[test]
    fn generated_codes_use_the_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let code = generate_code(&mut rng);
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }
}
