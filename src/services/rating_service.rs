//! Calificaciones entre participantes de un viaje

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::models::rating::average_rating;
use crate::models::{Caller, Rating, Role};
use crate::repositories::RideStore;
use crate::utils::errors::{forbidden_error, not_found_error, AppResult};
use crate::utils::validation::{to_app_error, validate_not_empty, validate_rate};

#[derive(Clone)]
pub struct RatingService {
    store: Arc<dyn RideStore>,
}

impl RatingService {
    pub fn new(store: Arc<dyn RideStore>) -> Self {
        Self { store }
    }

    /// El pasajero califica al conductor y el conductor al pasajero
    pub async fn rate_ride(&self, ride_id: Uuid, caller: &Caller, rate: i32, comment: String) -> AppResult<Rating> {
        validate_rate(rate).map_err(to_app_error)?;
        validate_not_empty(&comment).map_err(to_app_error)?;

        let mut tx = self.store.begin().await?;
        let ride = tx
            .lock_ride(ride_id)
            .await?
            .ok_or_else(|| not_found_error("Ride", &ride_id.to_string()))?;

        let driver_id = ride
            .driver_id
            .ok_or_else(|| forbidden_error("rate ride", "ride has no driver yet"))?;

        let (target_id, target_role) = match caller.role {
            Role::Consumer if caller.user_id == ride.consumer_id => (driver_id, Role::Driver),
            Role::Driver if caller.user_id == driver_id => (ride.consumer_id, Role::Consumer),
            _ => return Err(forbidden_error("rate ride", "caller is not a participant of the ride")),
        };

        let rating = Rating {
            id: Uuid::new_v4(),
            ride_id,
            author_id: caller.user_id,
            target_id,
            target_role,
            rate,
            comment,
            date_created: Utc::now(),
        };
        tx.insert_rating(&rating).await?;
        tx.commit().await?;

        info!("⭐ {} calificó con {} al {} {}", caller.user_id, rate, target_role, target_id);
        Ok(rating)
    }

    /// Promedio recibido por un usuario en un rol, con dos decimales
    pub async fn average_rating(&self, user_id: Uuid, role: Role) -> AppResult<Decimal> {
        let mut tx = self.store.begin().await?;
        let (sum, count) = tx.rating_totals(user_id, role).await?;
        Ok(average_rating(sum, count))
    }
}
