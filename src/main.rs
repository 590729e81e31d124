use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use farm_storefront::{
    app::build_app,
    config::AppConfig,
    db::{create_pool, run_migrations},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,farm_storefront=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url)
        .await
        .context("failed to connect to the database")?;
    let state = AppState::new(pool, &config);
    run_migrations(&state.orm).await?;

    tracing::info!(
        latitude = config.store_location.latitude,
        longitude = config.store_location.longitude,
        "deliveries leave from store location"
    );

    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("APP_HOST {} is not an IP address", config.host))?;
    let addr = SocketAddr::from((host, config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
