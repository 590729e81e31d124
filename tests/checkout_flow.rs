mod common;

use chrono::{Duration, Utc};
use farm_storefront::{
    dto::{
        orders::CheckoutRequest,
        vouchers::{ApplicabilityKind, CreateVoucherRequest, ValidateVoucherRequest},
    },
    entity::products::Entity as Products,
    pricing::VoucherType,
    routes::params::Pagination,
    services::{cart_service, order_service, product_service, voucher_service},
};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use uuid::Uuid;

use common::{add, admin, create_product, database_url, lock_db, setup_state, shopper};

// Shopper previews a voucher, checks out with it, then a second checkout
// finds the voucher used up and pays full price.
#[tokio::test]
async fn voucher_checkout_and_exhaustion_flow() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let _db = lock_db().await;
    let state = setup_state(&database_url).await?;

    let shopper = shopper();
    let admin = admin();
    let product = create_product(&state, &admin, "Sweet Corn", 100, 10).await?;

    let voucher = voucher_service::create_voucher(
        &state,
        &admin,
        CreateVoucherRequest {
            code: Some("harvest10".into()),
            description: "Harvest week".into(),
            voucher_type: VoucherType::Percentage,
            discount_value: Decimal::from(10),
            minimum_order_amount: Some(Decimal::from(100)),
            maximum_discount: None,
            valid_from: Utc::now() - Duration::hours(1),
            valid_to: Utc::now() + Duration::days(1),
            usage_limit: Some(1),
            applicability: ApplicabilityKind::SpecificCategory,
            applicable_category: Some("Vegetables".into()),
            applicable_product_id: None,
        },
    )
    .await?
    .data
    .expect("voucher");
    assert_eq!(voucher.code, "HARVEST10");

    add(&state, &shopper, product.id, 3).await?;

    // Preview does not consume the voucher
    let preview = voucher_service::validate_voucher(
        &state,
        &shopper,
        ValidateVoucherRequest {
            code: " Harvest10 ".into(),
        },
    )
    .await?
    .data
    .expect("preview");
    assert!(preview.success, "{}", preview.message);
    assert_eq!(preview.discount_amount, Some(Decimal::from(30)));
    assert_eq!(preview.new_total, Some(Decimal::from(270)));

    // No coordinates: flat fallback fee
    let first = order_service::checkout(
        &state,
        &shopper,
        CheckoutRequest {
            address: Some("Jl. Sawah 1".into()),
            payment_method: "cash".into(),
            voucher_code: Some("harvest10".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("checkout");
    assert_eq!(first.order.subtotal, Decimal::from(300));
    assert_eq!(first.order.discount_amount, Decimal::from(30));
    assert_eq!(first.order.shipping_fee, Decimal::from(50));
    assert_eq!(first.order.total_amount, Decimal::from(320));
    assert_eq!(first.order.voucher_code.as_deref(), Some("HARVEST10"));
    assert_eq!(first.items.len(), 1);

    let usages = voucher_service::list_voucher_usages(
        &state,
        &admin,
        voucher.id,
        Pagination::default(),
    )
    .await?
    .data
    .expect("usages");
    assert_eq!(usages.items.len(), 1);
    let usage = &usages.items[0];
    assert_eq!(usage.order_id, first.order.id);
    assert_eq!(usage.discount_amount, Decimal::from(30));
    assert_eq!(usage.total_before, Decimal::from(350));
    assert_eq!(usage.total_after, Decimal::from(320));

    let stored = voucher_service::get_voucher(&state, &admin, voucher.id)
        .await?
        .data
        .expect("voucher");
    assert_eq!(stored.used_count, 1);

    // Second order: voucher is exhausted, checkout still succeeds
    add(&state, &shopper, product.id, 2).await?;
    let second = order_service::checkout(
        &state,
        &shopper,
        CheckoutRequest {
            payment_method: "transfer".into(),
            latitude: Some(state.store_location.latitude),
            longitude: Some(state.store_location.longitude),
            voucher_code: Some("HARVEST10".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("checkout");
    assert_eq!(
        second.voucher_message.as_deref(),
        Some("Voucher has expired or reached its usage limit")
    );
    assert_eq!(second.order.discount_amount, Decimal::ZERO);
    assert_eq!(second.order.voucher_id, None);
    assert_eq!(second.order.shipping_fee, Decimal::from(50));
    assert_eq!(second.order.total_amount, Decimal::from(250));

    let remaining = product_service::get_product(&state, product.id)
        .await?
        .data
        .expect("product");
    assert_eq!(remaining.stock, 5);

    let cart = cart_service::list_cart(&state, &shopper)
        .await?
        .data
        .expect("cart");
    assert!(cart.items.is_empty());

    Ok(())
}

// Large carts ship free even without delivery coordinates.
#[tokio::test]
async fn checkout_without_coordinates_ships_free_over_threshold() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let _db = lock_db().await;
    let state = setup_state(&database_url).await?;
    let shopper = shopper();
    let product = create_product(&state, &admin(), "Fresh Milk", 120, 20).await?;

    add(&state, &shopper, product.id, 5).await?;
    let checkout = order_service::checkout(
        &state,
        &shopper,
        CheckoutRequest {
            payment_method: "cash".into(),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("checkout");

    assert_eq!(checkout.order.subtotal, Decimal::from(600));
    assert_eq!(checkout.order.shipping_fee, Decimal::ZERO);
    assert_eq!(checkout.order.total_amount, Decimal::from(600));
    assert!(checkout.is_free_shipping);
    Ok(())
}

// A product voucher always keeps its target product.
#[tokio::test]
async fn product_voucher_target_is_protected() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let _db = lock_db().await;
    let state = setup_state(&database_url).await?;
    let admin = admin();
    let compost = create_product(&state, &admin, "Organic Compost", 45, 10).await?;

    voucher_service::create_voucher(
        &state,
        &admin,
        CreateVoucherRequest {
            code: Some("COMPOST5".into()),
            description: String::new(),
            voucher_type: VoucherType::FixedAmount,
            discount_value: Decimal::from(5),
            minimum_order_amount: None,
            maximum_discount: None,
            valid_from: Utc::now() - Duration::hours(1),
            valid_to: Utc::now() + Duration::days(1),
            usage_limit: None,
            applicability: ApplicabilityKind::SpecificProduct,
            applicable_category: None,
            applicable_product_id: Some(compost.id),
        },
    )
    .await?;

    let deleted = Products::delete_by_id(compost.id).exec(&state.orm).await;
    assert!(deleted.is_err(), "product referenced by a voucher must not be deleted");

    // a specific_product row without a target is refused by the schema
    let orphan = sqlx::query(
        r#"
        INSERT INTO vouchers (id, code, voucher_type, discount_value, valid_from, valid_to, applicability)
        VALUES ($1, 'ORPHAN1', 'fixed_amount', 5, NOW(), NOW() + INTERVAL '1 day', 'specific_product')
        "#,
    )
    .bind(Uuid::new_v4())
    .execute(&state.pool)
    .await;
    assert!(orphan.is_err());

    Ok(())
}
