//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::RideStore;
use crate::services::{AddressService, FlatRatePricing, RatingService, RideService, StopQueueEngine};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub jwt: JwtConfig,
    pub rides: RideService,
    pub queue: StopQueueEngine,
    pub ratings: RatingService,
    pub addresses: AddressService,
}

impl AppState {
    /// Montar los servicios sobre un almacén de viajes
    pub fn new(config: EnvironmentConfig, store: Arc<dyn RideStore>) -> Self {
        let pricing = Arc::new(FlatRatePricing::new(config.ride_flat_price));

        Self {
            jwt: JwtConfig::from(&config),
            rides: RideService::new(store.clone(), pricing, config.available_rides_limit),
            queue: StopQueueEngine::new(store.clone()),
            ratings: RatingService::new(store.clone()),
            addresses: AddressService::new(store),
            config,
        }
    }
}
