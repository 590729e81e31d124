use chrono::{Duration, Utc};
use farm_storefront::pricing::{
    Applicability, Cart, CartLine, Coordinates, ShippingCalculator, Voucher, VoucherType,
    voucher::{self, Rejection},
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn dec(value: &str) -> Decimal {
    value.parse().expect("decimal literal")
}

fn cart_of(total: &str, quantity: i32) -> Cart {
    // one line whose total equals `total`
    let total = dec(total);
    Cart::new(vec![CartLine {
        product_id: Uuid::new_v4(),
        category: "Vegetables".into(),
        quantity,
        price_per_unit: total / Decimal::from(quantity),
        unit: "kg".into(),
    }])
}

fn voucher(code: &str, voucher_type: VoucherType, value: &str) -> Voucher {
    let now = Utc::now();
    Voucher {
        id: Uuid::new_v4(),
        code: code.into(),
        description: String::new(),
        voucher_type,
        discount_value: dec(value),
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

#[test]
fn percentage_voucher_takes_ten_percent() {
    let save10 = voucher("SAVE10", VoucherType::Percentage, "10");
    let discount = voucher::calculate_discount(&save10, dec("200"));
    assert_eq!(discount, dec("20.00"));
    assert_eq!(voucher::discounted_total(dec("200"), discount), dec("180.00"));
}

#[test]
fn fixed_voucher_never_exceeds_cart_total() {
    let flat50 = voucher("FLAT50", VoucherType::FixedAmount, "50");
    let discount = voucher::calculate_discount(&flat50, dec("30"));
    assert_eq!(discount, dec("30.00"));
    assert_eq!(voucher::discounted_total(dec("30"), discount), Decimal::ZERO);
}

#[test]
fn percentage_voucher_respects_maximum_discount() {
    let mut big20 = voucher("BIG20", VoucherType::Percentage, "20");
    big20.maximum_discount = Some(dec("15"));
    assert_eq!(voucher::calculate_discount(&big20, dec("1000")), dec("15.00"));
}

#[test]
fn large_orders_ship_free() {
    let calc = ShippingCalculator::default();
    for distance in ["0", "25", "5000"] {
        let quote = calc.fee_for_distance(dec(distance), &cart_of("600", 40));
        assert_eq!(quote.shipping_fee, Decimal::ZERO);
        assert!(quote.is_free_shipping);
    }

    // no coordinates at all
    let quote = calc.fallback_quote(&cart_of("600", 40));
    assert_eq!(quote.shipping_fee, Decimal::ZERO);
    assert!(quote.is_free_shipping);
}

#[test]
fn distance_surcharge_beyond_free_radius() {
    let calc = ShippingCalculator::default();
    let quote = calc.fee_for_distance(dec("25"), &cart_of("100", 3));
    assert_eq!(quote.shipping_fee, dec("80.00"));
    assert!(!quote.is_free_shipping);
}

#[test]
fn distance_surcharge_from_coordinates() {
    // along a meridian the great-circle distance is R * dlat, 0.22483 deg ~ 25 km
    let calc = ShippingCalculator::default();
    let origin = Coordinates::new(0.0, 0.0);
    let destination = Coordinates::new(0.22483, 0.0);

    let quote = calc.calculate_fee(origin, destination, &cart_of("100", 3));
    assert_eq!(quote.distance_km, dec("25.00"));
    assert_eq!(quote.shipping_fee, dec("80.00"));
    assert!(!quote.is_free_shipping);
}

#[test]
fn expired_voucher_is_rejected_with_reason() {
    let mut expired = voucher("EXPIRED1", VoucherType::Percentage, "10");
    expired.valid_from = Utc::now() - Duration::days(30);
    expired.valid_to = Utc::now() - Duration::days(1);

    let rejection = voucher::validate(Some(&expired), &cart_of("100", 1), Utc::now())
        .expect_err("expired voucher must be rejected");
    assert_eq!(rejection, Rejection::ExpiredOrExhausted);
    assert!(rejection.to_string().contains("expired"));
}

#[test]
fn fee_stays_between_zero_and_cap() {
    let calc = ShippingCalculator::default();
    for distance in ["0", "9.99", "10", "60", "95", "1000"] {
        for quantity in [1, 5, 6, 30, 200] {
            let quote = calc.fee_for_distance(dec(distance), &cart_of("120", quantity));
            assert!(quote.shipping_fee >= Decimal::ZERO);
            assert!(quote.shipping_fee <= dec("200"), "{distance} km x {quantity}");
        }
    }
}

#[test]
fn discount_is_bounded_by_cart_total_and_repeatable() {
    let vouchers = [
        voucher("A", VoucherType::FixedAmount, "75"),
        voucher("B", VoucherType::Percentage, "100"),
        voucher("C", VoucherType::Percentage, "33.33"),
    ];
    for v in &vouchers {
        for total in ["0", "0.01", "49.99", "75", "1234.56"] {
            let first = voucher::calculate_discount(v, dec(total));
            assert!(first >= Decimal::ZERO);
            assert!(first <= dec(total));
            assert_eq!(first, voucher::calculate_discount(v, dec(total)));
        }
    }
}

#[test]
fn validation_without_usage_is_repeatable() {
    let mut minimum = voucher("MIN100", VoucherType::FixedAmount, "10");
    minimum.minimum_order_amount = Some(dec("100"));
    let now = Utc::now();

    for cart in [cart_of("150", 2), cart_of("99.99", 1)] {
        let first = voucher::validate(Some(&minimum), &cart, now);
        let second = voucher::validate(Some(&minimum), &cart, now);
        assert_eq!(first, second);
    }
    assert_eq!(minimum.used_count, 0);
}

#[test]
fn usage_limit_is_reached_after_last_use() {
    let mut limited = voucher("ONCE", VoucherType::FixedAmount, "5");
    limited.usage_limit = 1;
    assert!(limited.is_valid(Utc::now()));

    limited.apply_usage();
    assert!(!limited.is_valid(Utc::now()));
    assert_eq!(
        voucher::validate(Some(&limited), &cart_of("50", 1), Utc::now()),
        Err(Rejection::ExpiredOrExhausted)
    );
}

#[test]
fn codes_match_case_insensitively() {
    assert_eq!(voucher::normalize_code("  save10 "), Ok("SAVE10".to_string()));
    assert_eq!(voucher::normalize_code("Save10"), voucher::normalize_code("SAVE10"));
    assert_eq!(voucher::normalize_code("   "), Err(Rejection::NoCode));
}
