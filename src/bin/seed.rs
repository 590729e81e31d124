use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use farm_storefront::{
    config::AppConfig,
    db::{DbPool, create_pool, orm_from_pool, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm_from_pool(pool.clone())).await?;

    seed_products(&pool).await?;
    seed_vouchers(&pool).await?;

    tracing::info!("seed completed");
    Ok(())
}

async fn seed_products(pool: &DbPool) -> anyhow::Result<()> {
    let products = [
        ("Free-range Eggs", "A tray of 30 eggs", "Dairy & Eggs", "tray", Decimal::new(6500, 2), 40),
        ("Fresh Milk", "Raw milk from the morning milking", "Dairy & Eggs", "l", Decimal::new(1800, 2), 120),
        ("Sweet Corn", "Picked this week", "Vegetables", "kg", Decimal::new(1200, 2), 300),
        ("Cassava", "Whole roots", "Vegetables", "kg", Decimal::new(800, 2), 250),
        ("Organic Compost", "Cured for 90 days", "Supplies", "sack", Decimal::new(4500, 2), 60),
    ];

    for (name, desc, category, unit, price, stock) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, category, unit, price, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(category)
        .bind(unit)
        .bind(price)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    tracing::info!(count = products.len(), "seeded products");
    Ok(())
}

async fn seed_vouchers(pool: &DbPool) -> anyhow::Result<()> {
    let now = Utc::now();
    let vouchers = [
        ("SAVE10", "10% off everything", "percentage", Decimal::from(10), None),
        ("FLAT50", "50 off your order", "fixed_amount", Decimal::from(50), None),
        ("BIG20", "20% off, up to 15", "percentage", Decimal::from(20), Some(Decimal::from(15))),
    ];

    for (code, desc, voucher_type, value, cap) in vouchers {
        sqlx::query(
            r#"
            INSERT INTO vouchers
                (id, code, description, voucher_type, discount_value, maximum_discount, valid_from, valid_to)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(code)
        .bind(desc)
        .bind(voucher_type)
        .bind(value)
        .bind(cap)
        .bind(now)
        .bind(now + Duration::days(90))
        .execute(pool)
        .await?;
    }

    tracing::info!(count = vouchers.len(), "seeded vouchers");
    Ok(())
}
