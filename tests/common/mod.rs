#![allow(dead_code)]

use farm_storefront::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{cart::AddToCartRequest, products::CreateProductRequest},
    middleware::auth::AuthUser,
    models::Product,
    pricing::Coordinates,
    services::{cart_service, product_service},
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Statement};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

// Flows in one test binary share the database; hold this for the whole test.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

pub async fn lock_db() -> MutexGuard<'static, ()> {
    DB_LOCK.lock().await
}

/// Database for integration flows, or `None` to skip them.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            None
        }
    }
}

pub async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        store_location: Coordinates::new(-6.2, 106.816666),
    };
    let pool = create_pool(&config.database_url).await?;
    let state = AppState::new(pool, &config);
    run_migrations(&state.orm).await?;

    // Clean tables between runs
    let backend = state.orm.get_database_backend();
    state
        .orm
        .execute(Statement::from_string(
            backend,
            "TRUNCATE TABLE voucher_usages, order_items, orders, cart_items, vouchers, audit_logs, products RESTART IDENTITY CASCADE",
        ))
        .await?;

    Ok(state)
}

pub fn shopper() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: "user".into(),
    }
}

pub fn admin() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: "admin".into(),
    }
}

pub async fn create_product(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<Product> {
    let product = product_service::create_product(
        state,
        admin,
        CreateProductRequest {
            name: name.into(),
            description: None,
            category: "Vegetables".into(),
            unit: "kg".into(),
            price: Decimal::from(price),
            stock,
        },
    )
    .await?
    .data
    .expect("product");
    Ok(product)
}

pub async fn add(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<()> {
    cart_service::add_to_cart(state, user, AddToCartRequest { product_id, quantity }).await?;
    Ok(())
}
