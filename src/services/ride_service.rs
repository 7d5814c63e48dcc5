//! Servicio de viajes
//!
//! Creación, aceptación y lectura de viajes. Cada operación abre su propia
//! transacción y devuelve el viaje materializado (paradas, direcciones,
//! estado derivado y precio).

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Address, Caller, Ride, RideStatus, Stop};
use crate::repositories::{RideStore, RideTx};
use crate::services::pricing::PricingPolicy;
use crate::services::status::derive_status;
use crate::services::stop_queue::StopQueue;
use crate::utils::errors::{conflict_error, forbidden_error, not_found_error, AppError, AppResult};
use crate::utils::validation::{first_duplicate, to_app_error, validate_stop_list};

/// Viaje listo para presentar
#[derive(Debug, Clone)]
pub struct RideView {
    pub ride: Ride,
    pub queue: StopQueue,
    pub status: RideStatus,
    pub price: Decimal,
    pub addresses: HashMap<Uuid, Address>,
}

impl RideView {
    pub fn address_of(&self, stop: &Stop) -> Option<&Address> {
        self.addresses.get(&stop.address_id)
    }
}

#[derive(Clone)]
pub struct RideService {
    store: Arc<dyn RideStore>,
    pricing: Arc<dyn PricingPolicy>,
    available_limit: i64,
}

impl RideService {
    pub fn new(store: Arc<dyn RideStore>, pricing: Arc<dyn PricingPolicy>, available_limit: i64) -> Self {
        Self {
            store,
            pricing,
            available_limit,
        }
    }

    /// Crear un viaje con su lista inicial de paradas (orden = índice).
    ///
    /// El pasajero es el usuario autenticado si es consumer; si no, el id
    /// explícito. Sin ninguno de los dos la operación no está permitida.
    pub async fn create_ride(
        &self,
        caller: Option<&Caller>,
        consumer_id: Option<Uuid>,
        addresses: Vec<Uuid>,
    ) -> AppResult<RideView> {
        validate_stop_list(&addresses).map_err(to_app_error)?;
        if let Some(duplicate) = first_duplicate(&addresses) {
            return Err(conflict_error("Ride stop", "address", &duplicate.to_string()));
        }

        let consumer_id = caller
            .and_then(Caller::consumer_id)
            .or(consumer_id)
            .ok_or_else(|| forbidden_error("create ride", "caller is not a consumer"))?;

        let mut tx = self.store.begin().await?;
        tx.lock_participant(consumer_id).await?;

        if let Some(open) = tx.find_open_ride_for(consumer_id).await? {
            warn!("⚠️ El pasajero {} ya tiene el viaje abierto {}", consumer_id, open.id);
            return Err(AppError::Conflict(format!(
                "Consumer '{}' already has an open ride '{}'",
                consumer_id, open.id
            )));
        }

        let found = tx.find_addresses(&addresses).await?;
        if let Some(missing) = addresses.iter().find(|id| !found.iter().any(|a| a.id == **id)) {
            return Err(not_found_error("Address", &missing.to_string()));
        }

        let now = Utc::now();
        let ride = Ride::new(consumer_id, now);
        tx.insert_ride(&ride).await?;

        for (index, address_id) in addresses.iter().enumerate() {
            let stop = Stop::new(ride.id, *address_id, index as i32, now);
            tx.insert_stop(&stop).await?;
        }

        let view = self.materialize(tx.as_mut(), ride).await?;
        tx.commit().await?;

        info!("🚕 Viaje {} creado para {} con {} paradas", view.ride.id, consumer_id, view.queue.len());
        Ok(view)
    }

    /// Asignar el conductor. Solo uno puede aceptar un viaje.
    pub async fn accept_ride(&self, ride_id: Uuid, driver_id: Uuid) -> AppResult<RideView> {
        let mut tx = self.store.begin().await?;

        let mut ride = tx
            .lock_ride(ride_id)
            .await?
            .ok_or_else(|| not_found_error("Ride", &ride_id.to_string()))?;

        if !ride.is_open() {
            return Err(AppError::Conflict(format!("Ride '{}' is already completed", ride_id)));
        }
        if ride.driver_id.is_some() {
            warn!("⚠️ Viaje {} ya aceptado; rechazado conductor {}", ride_id, driver_id);
            return Err(AppError::Conflict(format!("Ride '{}' is already accepted", ride_id)));
        }

        tx.lock_participant(driver_id).await?;
        if let Some(open) = tx.find_open_ride_for(driver_id).await? {
            warn!("⚠️ El conductor {} ya tiene el viaje abierto {}", driver_id, open.id);
            return Err(AppError::Conflict(format!(
                "Driver '{}' already has an open ride '{}'",
                driver_id, open.id
            )));
        }

        if !tx.assign_driver(ride_id, driver_id).await? {
            warn!("⚠️ Viaje {} aceptado por otro conductor", ride_id);
            return Err(AppError::Conflict(format!("Ride '{}' is already accepted", ride_id)));
        }
        ride.driver_id = Some(driver_id);

        let view = self.materialize(tx.as_mut(), ride).await?;
        tx.commit().await?;

        info!("🤝 Viaje {} aceptado por el conductor {}", ride_id, driver_id);
        Ok(view)
    }

    /// Viaje abierto del usuario, como pasajero o como conductor
    pub async fn current_ride(&self, user_id: Uuid) -> AppResult<RideView> {
        let mut tx = self.store.begin().await?;
        let ride = tx
            .find_open_ride_for(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' has no current ride", user_id)))?;
        self.materialize(tx.as_mut(), ride).await
    }

    pub async fn get_ride(&self, ride_id: Uuid) -> AppResult<RideView> {
        let mut tx = self.store.begin().await?;
        let ride = tx
            .find_ride(ride_id)
            .await?
            .ok_or_else(|| not_found_error("Ride", &ride_id.to_string()))?;
        self.materialize(tx.as_mut(), ride).await
    }

    /// Viajes abiertos sin conductor, los más recientes primero
    pub async fn available_rides(&self) -> AppResult<Vec<RideView>> {
        let mut tx = self.store.begin().await?;
        let rides = tx.list_available_rides(self.available_limit).await?;

        let mut views = Vec::with_capacity(rides.len());
        for ride in rides {
            views.push(self.materialize(tx.as_mut(), ride).await?);
        }
        Ok(views)
    }

    async fn materialize(&self, tx: &mut dyn RideTx, ride: Ride) -> AppResult<RideView> {
        let queue = StopQueue::new(tx.stops_for_ride(ride.id).await?);
        let address_ids: Vec<Uuid> = queue.stops().iter().map(|s| s.address_id).collect();
        let addresses = tx
            .find_addresses(&address_ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let status = derive_status(&ride, queue.stops());
        let price = self.pricing.quote(&ride, &queue);

        Ok(RideView {
            ride,
            queue,
            status,
            price,
            addresses,
        })
    }
}
