//! Cola de paradas de un viaje
//!
//! `StopQueue` es la vista ordenada (pura, sin I/O) de las paradas de un viaje.
//! `StopQueueEngine` aplica las operaciones de la cola dentro de una transacción
//! con el viaje bloqueado, de modo que dos operaciones sobre el mismo viaje
//! nunca se entrelazan.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Caller, Stop};
use crate::repositories::RideStore;
use crate::utils::errors::{
    conflict_error, forbidden_error, internal_error, not_found_error, AppError, AppResult,
};

/// Paradas de un viaje ordenadas por `order` (desempate por `date_created`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopQueue {
    stops: Vec<Stop>,
}

/// Iterador perezoso sobre las paradas pendientes, en orden de visita.
/// Se puede clonar para recorrerlo de nuevo desde el principio.
#[derive(Debug, Clone)]
pub struct PendingStops<'a> {
    inner: std::slice::Iter<'a, Stop>,
}

impl<'a> Iterator for PendingStops<'a> {
    type Item = &'a Stop;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find(|stop| stop.is_pending())
    }
}

impl StopQueue {
    pub fn new(mut stops: Vec<Stop>) -> Self {
        stops.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| a.date_created.cmp(&b.date_created))
        });
        Self { stops }
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn into_stops(self) -> Vec<Stop> {
        self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn get(&self, stop_id: Uuid) -> Option<&Stop> {
        self.stops.iter().find(|s| s.id == stop_id)
    }

    pub fn pending(&self) -> PendingStops<'_> {
        PendingStops {
            inner: self.stops.iter(),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    /// La única parada que puede completarse a continuación
    pub fn next_pending(&self) -> Option<&Stop> {
        self.pending().next()
    }

    /// Posición que recibe una parada añadida al final
    pub fn next_order(&self) -> i32 {
        self.stops.len() as i32
    }

    pub fn contains_address(&self, address_id: Uuid) -> bool {
        self.stops.iter().any(|s| s.address_id == address_id)
    }

    pub fn all_completed(&self) -> bool {
        self.stops.iter().all(|s| !s.is_pending())
    }

    /// Las posiciones forman exactamente 0..N-1
    pub fn is_contiguous(&self) -> bool {
        self.stops
            .iter()
            .enumerate()
            .all(|(index, stop)| stop.order == index as i32)
    }

    /// Quitar una parada y compactar las posiciones posteriores.
    /// Devuelve la parada quitada y las nuevas posiciones `(stop_id, order)`
    /// en orden ascendente, listas para persistir.
    pub fn remove(&mut self, stop_id: Uuid) -> Option<(Stop, Vec<(Uuid, i32)>)> {
        let index = self.stops.iter().position(|s| s.id == stop_id)?;
        let removed = self.stops.remove(index);

        let mut renumbered = Vec::new();
        for stop in self.stops.iter_mut().filter(|s| s.order > removed.order) {
            stop.order -= 1;
            renumbered.push((stop.id, stop.order));
        }

        Some((removed, renumbered))
    }
}

/// Resultado de completar la siguiente parada
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    Completed { stop: Stop, ride_closed: bool },
    /// No quedaban paradas pendientes; no se modificó nada
    AlreadyCompleted,
}

/// Motor de la cola de paradas
#[derive(Clone)]
pub struct StopQueueEngine {
    store: Arc<dyn RideStore>,
}

impl StopQueueEngine {
    pub fn new(store: Arc<dyn RideStore>) -> Self {
        Self { store }
    }

    /// Añadir una parada al final de la cola
    pub async fn add_stop(&self, ride_id: Uuid, address_id: Uuid) -> AppResult<Stop> {
        self.add(ride_id, address_id, None).await
    }

    /// Igual que `add_stop`, pero solo un participante del viaje puede hacerlo
    pub async fn add_stop_as(&self, ride_id: Uuid, address_id: Uuid, caller: &Caller) -> AppResult<Stop> {
        self.add(ride_id, address_id, Some(caller.user_id)).await
    }

    async fn add(&self, ride_id: Uuid, address_id: Uuid, participant: Option<Uuid>) -> AppResult<Stop> {
        let mut tx = self.store.begin().await?;

        let ride = tx
            .lock_ride(ride_id)
            .await?
            .ok_or_else(|| not_found_error("Ride", &ride_id.to_string()))?;
        if let Some(user_id) = participant {
            if !ride.involves(user_id) {
                return Err(forbidden_error("add stop", "caller is not a participant of the ride"));
            }
        }
        if !ride.is_open() {
            return Err(AppError::Conflict(format!("Ride '{}' is already completed", ride_id)));
        }

        if tx.find_addresses(&[address_id]).await?.is_empty() {
            return Err(not_found_error("Address", &address_id.to_string()));
        }

        let queue = StopQueue::new(tx.stops_for_ride(ride_id).await?);
        if queue.contains_address(address_id) {
            return Err(conflict_error("Ride stop", "address", &address_id.to_string()));
        }

        let stop = Stop::new(ride_id, address_id, queue.next_order(), Utc::now());
        tx.insert_stop(&stop).await?;
        tx.commit().await?;

        info!("📍 Parada {} añadida al viaje {} en posición {}", stop.id, ride_id, stop.order);
        Ok(stop)
    }

    /// Completar la parada pendiente de menor posición
    pub async fn complete_next_stop(&self, ride_id: Uuid) -> AppResult<CompletionOutcome> {
        self.complete_next(ride_id, None).await
    }

    /// Igual que `complete_next_stop`, pero solo el conductor asignado puede hacerlo
    pub async fn complete_next_stop_as(&self, ride_id: Uuid, caller: &Caller) -> AppResult<CompletionOutcome> {
        let driver_id = caller
            .driver_id()
            .ok_or_else(|| forbidden_error("complete stop", "caller is not a driver"))?;
        self.complete_next(ride_id, Some(driver_id)).await
    }

    async fn complete_next(&self, ride_id: Uuid, required_driver: Option<Uuid>) -> AppResult<CompletionOutcome> {
        let mut tx = self.store.begin().await?;

        let ride = tx
            .lock_ride(ride_id)
            .await?
            .ok_or_else(|| not_found_error("Ride", &ride_id.to_string()))?;

        if let Some(driver_id) = required_driver {
            if ride.driver_id != Some(driver_id) {
                return Err(forbidden_error("complete stop", "caller is not the ride driver"));
            }
        }

        let queue = StopQueue::new(tx.stops_for_ride(ride_id).await?);
        let Some(next) = queue.next_pending().cloned() else {
            debug!("🔁 Viaje {} sin paradas pendientes", ride_id);
            return Ok(CompletionOutcome::AlreadyCompleted);
        };

        let now = Utc::now();
        if !tx.complete_stop(next.id, now).await? {
            return Err(internal_error("pending stop changed while the ride was locked"));
        }

        let ride_closed = if queue.pending_count() == 1 {
            tx.close_ride(ride_id, now).await?
        } else {
            false
        };

        tx.commit().await?;

        info!("✅ Parada {} (posición {}) completada en viaje {}", next.id, next.order, ride_id);
        if ride_closed {
            info!("🏁 Viaje {} cerrado", ride_id);
        }

        Ok(CompletionOutcome::Completed {
            stop: Stop {
                date_ended: Some(now),
                ..next
            },
            ride_closed,
        })
    }

    /// Eliminar una parada y renumerar las posteriores en la misma transacción
    pub async fn delete_stop(&self, stop_id: Uuid) -> AppResult<StopQueue> {
        self.delete(stop_id, None).await
    }

    /// Igual que `delete_stop`, pero solo un participante del viaje puede hacerlo
    pub async fn delete_stop_as(&self, stop_id: Uuid, caller: &Caller) -> AppResult<StopQueue> {
        self.delete(stop_id, Some(caller.user_id)).await
    }

    async fn delete(&self, stop_id: Uuid, participant: Option<Uuid>) -> AppResult<StopQueue> {
        let mut tx = self.store.begin().await?;

        let ride_id = tx
            .find_stop(stop_id)
            .await?
            .ok_or_else(|| not_found_error("Stop", &stop_id.to_string()))?
            .ride_id;

        let ride = tx
            .lock_ride(ride_id)
            .await?
            .ok_or_else(|| not_found_error("Ride", &ride_id.to_string()))?;

        // Releer bajo el bloqueo: la posición pudo cambiar antes de obtenerlo
        let mut queue = StopQueue::new(tx.stops_for_ride(ride_id).await?);
        let stop = queue
            .get(stop_id)
            .cloned()
            .ok_or_else(|| not_found_error("Stop", &stop_id.to_string()))?;

        if let Some(user_id) = participant {
            if !ride.involves(user_id) {
                return Err(forbidden_error("delete stop", "caller is not a participant of the ride"));
            }
        }
        if !ride.is_open() {
            return Err(AppError::Conflict(format!("Ride '{}' is already completed", ride_id)));
        }
        if !stop.is_pending() {
            return Err(AppError::Conflict("Completed stops cannot be removed".to_string()));
        }
        if queue.pending_count() == 1 {
            return Err(AppError::Conflict(
                "The last pending stop of a ride cannot be removed".to_string(),
            ));
        }

        let (removed, renumbered) = queue
            .remove(stop_id)
            .ok_or_else(|| not_found_error("Stop", &stop_id.to_string()))?;

        if !tx.delete_stop(removed.id).await? {
            return Err(not_found_error("Stop", &stop_id.to_string()));
        }
        for (id, order) in &renumbered {
            tx.set_stop_order(*id, *order).await?;
        }

        tx.commit().await?;

        info!(
            "🗑️ Parada {} eliminada del viaje {}; {} paradas renumeradas",
            stop_id,
            ride_id,
            renumbered.len()
        );
        Ok(queue)
    }

    /// Cola del viaje; `pending()` recorre las paradas pendientes en orden
    pub async fn list_pending(&self, ride_id: Uuid) -> AppResult<StopQueue> {
        let mut tx = self.store.begin().await?;
        if tx.find_ride(ride_id).await?.is_none() {
            return Err(not_found_error("Ride", &ride_id.to_string()));
        }
        Ok(StopQueue::new(tx.stops_for_ride(ride_id).await?))
    }
}
