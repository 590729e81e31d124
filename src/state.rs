use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, orm_from_pool},
    pricing::{Coordinates, ShippingCalculator},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub store_location: Coordinates,
    pub shipping: ShippingCalculator,
}

impl AppState {
    pub fn new(pool: DbPool, config: &AppConfig) -> Self {
        Self {
            orm: orm_from_pool(pool.clone()),
            pool,
            store_location: config.store_location,
            shipping: ShippingCalculator::default(),
        }
    }
}
