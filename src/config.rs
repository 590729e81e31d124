use std::env;

use anyhow::Context;

use crate::pricing::Coordinates;

const DEFAULT_STORE_LATITUDE: f64 = -6.2;
const DEFAULT_STORE_LONGITUDE: f64 = 106.816666;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Where deliveries leave from.
    pub store_location: Coordinates,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        let store_location = Coordinates::new(
            coordinate_from_env("STORE_LATITUDE", DEFAULT_STORE_LATITUDE)?,
            coordinate_from_env("STORE_LONGITUDE", DEFAULT_STORE_LONGITUDE)?,
        );
        if !store_location.is_valid() {
            anyhow::bail!("STORE_LATITUDE/STORE_LONGITUDE are out of range");
        }

        Ok(Self {
            port,
            database_url,
            host,
            store_location,
        })
    }
}

fn coordinate_from_env(key: &str, default: f64) -> anyhow::Result<f64> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("{key} is not a number")),
        Err(_) => Ok(default),
    }
}
