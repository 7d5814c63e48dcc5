//! Store en memoria
//!
//! Cada transacción trabaja sobre copias por viaje (`RideSlot`) y las publica
//! juntas en `commit`. Los bloqueos son por clave (viaje o participante), así
//! que viajes distintos avanzan en paralelo.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Address, Rating, Ride, Role, Stop};
use crate::utils::errors::{internal_error, not_found_error, AppError, AppResult};

use super::ride_store::{RideStore, RideTx};

/// Un viaje con todo lo que le pertenece
#[derive(Debug, Clone)]
struct RideSlot {
    ride: Ride,
    stops: Vec<Stop>,
    ratings: Vec<Rating>,
}

#[derive(Default)]
struct Tables {
    rides: HashMap<Uuid, RideSlot>,
    addresses: HashMap<Uuid, Address>,
}

impl Tables {
    /// Misma dirección ya publicada, por id o por ciudad, distrito, calle y número
    fn address_taken(&self, address: &Address) -> bool {
        self.addresses.contains_key(&address.id)
            || self.addresses.values().any(|a| same_place(a, address))
    }
}

fn same_place(a: &Address, b: &Address) -> bool {
    a.city == b.city && a.district == b.district && a.street == b.street && a.name == b.name
}

fn address_conflict(address: &Address) -> AppError {
    AppError::Conflict(format!("Address '{}' already exists", address.full_address()))
}

#[derive(Default)]
struct Inner {
    tables: RwLock<Tables>,
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

#[derive(Clone, Default)]
pub struct MemoryRideStore {
    inner: Arc<Inner>,
}

impl MemoryRideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sembrar una dirección fuera de cualquier transacción
    pub fn insert_address(&self, address: Address) -> AppResult<()> {
        let mut tables = self
            .inner
            .tables
            .write()
            .map_err(|_| internal_error("memory store poisoned"))?;
        if tables.address_taken(&address) {
            return Err(address_conflict(&address));
        }
        tables.addresses.insert(address.id, address);
        Ok(())
    }
}

#[async_trait]
impl RideStore for MemoryRideStore {
    async fn begin(&self) -> AppResult<Box<dyn RideTx>> {
        Ok(Box::new(MemoryRideTx {
            inner: Arc::clone(&self.inner),
            staged: HashMap::new(),
            staged_addresses: Vec::new(),
            held: HashMap::new(),
        }))
    }
}

pub struct MemoryRideTx {
    inner: Arc<Inner>,
    staged: HashMap<Uuid, RideSlot>,
    staged_addresses: Vec<Address>,
    held: HashMap<Uuid, OwnedMutexGuard<()>>,
}

impl MemoryRideTx {
    fn tables(&self) -> AppResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .tables
            .read()
            .map_err(|_| internal_error("memory store poisoned"))
    }

    async fn acquire(&mut self, key: Uuid) -> AppResult<()> {
        if self.held.contains_key(&key) {
            return Ok(());
        }
        let lock = {
            let mut locks = self
                .inner
                .locks
                .lock()
                .map_err(|_| internal_error("lock registry poisoned"))?;
            Arc::clone(locks.entry(key).or_default())
        };
        let guard = lock.lock_owned().await;
        self.held.insert(key, guard);
        Ok(())
    }

    fn address(&self, address_id: Uuid) -> AppResult<Option<Address>> {
        if let Some(address) = self.staged_addresses.iter().find(|a| a.id == address_id) {
            return Ok(Some(address.clone()));
        }
        Ok(self.tables()?.addresses.get(&address_id).cloned())
    }

    fn slot(&self, ride_id: Uuid) -> AppResult<Option<RideSlot>> {
        if let Some(slot) = self.staged.get(&ride_id) {
            return Ok(Some(slot.clone()));
        }
        Ok(self.tables()?.rides.get(&ride_id).cloned())
    }

    /// Copia de trabajo del viaje; se crea la primera vez que se escribe
    fn slot_mut(&mut self, ride_id: Uuid) -> AppResult<&mut RideSlot> {
        if !self.staged.contains_key(&ride_id) {
            let committed = self
                .tables()?
                .rides
                .get(&ride_id)
                .cloned()
                .ok_or_else(|| not_found_error("Ride", &ride_id.to_string()))?;
            self.staged.insert(ride_id, committed);
        }
        self.staged
            .get_mut(&ride_id)
            .ok_or_else(|| internal_error("staged ride vanished"))
    }

    /// Vista combinada: lo publicado más lo que esta transacción modificó
    fn all_slots(&self) -> AppResult<Vec<RideSlot>> {
        let tables = self.tables()?;
        let mut slots: Vec<RideSlot> = tables
            .rides
            .iter()
            .filter(|(id, _)| !self.staged.contains_key(id))
            .map(|(_, slot)| slot.clone())
            .collect();
        slots.extend(self.staged.values().cloned());
        Ok(slots)
    }

    fn ride_of_stop(&self, stop_id: Uuid) -> AppResult<Option<Uuid>> {
        Ok(self
            .all_slots()?
            .into_iter()
            .find(|slot| slot.stops.iter().any(|s| s.id == stop_id))
            .map(|slot| slot.ride.id))
    }

    fn open_ride_of(&self, user_id: Uuid, except: Option<Uuid>) -> AppResult<Option<Ride>> {
        Ok(self
            .all_slots()?
            .into_iter()
            .map(|slot| slot.ride)
            .filter(|ride| Some(ride.id) != except)
            .find(|ride| ride.is_open() && ride.involves(user_id)))
    }
}

#[async_trait]
impl RideTx for MemoryRideTx {
    async fn lock_ride(&mut self, ride_id: Uuid) -> AppResult<Option<Ride>> {
        self.acquire(ride_id).await?;
        Ok(self.slot(ride_id)?.map(|slot| slot.ride))
    }

    async fn lock_participant(&mut self, user_id: Uuid) -> AppResult<()> {
        self.acquire(user_id).await
    }

    async fn find_ride(&mut self, ride_id: Uuid) -> AppResult<Option<Ride>> {
        Ok(self.slot(ride_id)?.map(|slot| slot.ride))
    }

    async fn find_open_ride_for(&mut self, user_id: Uuid) -> AppResult<Option<Ride>> {
        self.open_ride_of(user_id, None)
    }

    async fn list_available_rides(&mut self, limit: i64) -> AppResult<Vec<Ride>> {
        let mut rides: Vec<Ride> = self
            .all_slots()?
            .into_iter()
            .map(|slot| slot.ride)
            .filter(|ride| ride.is_open() && ride.driver_id.is_none())
            .collect();
        rides.sort_by(|a, b| b.date_created.cmp(&a.date_created));
        rides.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rides)
    }

    async fn insert_ride(&mut self, ride: &Ride) -> AppResult<()> {
        if self.slot(ride.id)?.is_some() {
            return Err(AppError::Conflict(format!("Ride '{}' already exists", ride.id)));
        }
        if self.open_ride_of(ride.consumer_id, None)?.is_some() {
            return Err(AppError::Conflict(
                "Consumer already has an open ride".to_string(),
            ));
        }
        self.staged.insert(
            ride.id,
            RideSlot {
                ride: ride.clone(),
                stops: Vec::new(),
                ratings: Vec::new(),
            },
        );
        Ok(())
    }

    async fn assign_driver(&mut self, ride_id: Uuid, driver_id: Uuid) -> AppResult<bool> {
        if self.open_ride_of(driver_id, Some(ride_id))?.is_some() {
            return Err(AppError::Conflict("Driver already has an open ride".to_string()));
        }
        let slot = self.slot_mut(ride_id)?;
        if slot.ride.driver_id.is_some() || !slot.ride.is_open() {
            return Ok(false);
        }
        slot.ride.driver_id = Some(driver_id);
        Ok(true)
    }

    async fn close_ride(&mut self, ride_id: Uuid, ended_at: DateTime<Utc>) -> AppResult<bool> {
        let slot = self.slot_mut(ride_id)?;
        if !slot.ride.is_open() {
            return Ok(false);
        }
        slot.ride.date_ended = Some(ended_at);
        Ok(true)
    }

    async fn stops_for_ride(&mut self, ride_id: Uuid) -> AppResult<Vec<Stop>> {
        let mut stops = self.slot(ride_id)?.map(|slot| slot.stops).unwrap_or_default();
        stops.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| a.date_created.cmp(&b.date_created))
        });
        Ok(stops)
    }

    async fn find_stop(&mut self, stop_id: Uuid) -> AppResult<Option<Stop>> {
        Ok(self
            .all_slots()?
            .into_iter()
            .flat_map(|slot| slot.stops)
            .find(|stop| stop.id == stop_id))
    }

    async fn insert_stop(&mut self, stop: &Stop) -> AppResult<()> {
        if self.address(stop.address_id)?.is_none() {
            return Err(not_found_error("Address", &stop.address_id.to_string()));
        }
        let slot = self.slot_mut(stop.ride_id)?;
        if slot.stops.iter().any(|s| s.address_id == stop.address_id) {
            return Err(AppError::Conflict(format!(
                "Address '{}' is already in the ride queue",
                stop.address_id
            )));
        }
        if slot.stops.iter().any(|s| s.order == stop.order) {
            return Err(AppError::Conflict(format!(
                "Order {} is already taken in the ride queue",
                stop.order
            )));
        }
        slot.stops.push(stop.clone());
        Ok(())
    }

    async fn complete_stop(&mut self, stop_id: Uuid, ended_at: DateTime<Utc>) -> AppResult<bool> {
        let Some(ride_id) = self.ride_of_stop(stop_id)? else {
            return Ok(false);
        };
        let slot = self.slot_mut(ride_id)?;
        match slot.stops.iter_mut().find(|s| s.id == stop_id) {
            Some(stop) if stop.is_pending() => {
                stop.date_ended = Some(ended_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_stop_order(&mut self, stop_id: Uuid, order: i32) -> AppResult<()> {
        let ride_id = self
            .ride_of_stop(stop_id)?
            .ok_or_else(|| not_found_error("Stop", &stop_id.to_string()))?;
        let slot = self.slot_mut(ride_id)?;
        if let Some(stop) = slot.stops.iter_mut().find(|s| s.id == stop_id) {
            stop.order = order;
        }
        Ok(())
    }

    async fn delete_stop(&mut self, stop_id: Uuid) -> AppResult<bool> {
        let Some(ride_id) = self.ride_of_stop(stop_id)? else {
            return Ok(false);
        };
        let slot = self.slot_mut(ride_id)?;
        let before = slot.stops.len();
        slot.stops.retain(|s| s.id != stop_id);
        Ok(slot.stops.len() < before)
    }

    async fn find_addresses(&mut self, ids: &[Uuid]) -> AppResult<Vec<Address>> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(address) = self.address(*id)? {
                found.push(address);
            }
        }
        Ok(found)
    }

    async fn insert_address(&mut self, address: &Address) -> AppResult<()> {
        let staged = self
            .staged_addresses
            .iter()
            .any(|a| a.id == address.id || same_place(a, address));
        if staged || self.tables()?.address_taken(address) {
            return Err(address_conflict(address));
        }
        self.staged_addresses.push(address.clone());
        Ok(())
    }

    async fn list_addresses(&mut self, limit: i64) -> AppResult<Vec<Address>> {
        let mut addresses: Vec<Address> = self.tables()?.addresses.values().cloned().collect();
        addresses.extend(self.staged_addresses.iter().cloned());
        addresses.sort_by(|a, b| {
            (&a.city, &a.district, &a.street, &a.name).cmp(&(&b.city, &b.district, &b.street, &b.name))
        });
        addresses.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(addresses)
    }

    async fn insert_rating(&mut self, rating: &Rating) -> AppResult<()> {
        let slot = self.slot_mut(rating.ride_id)?;
        if slot.ratings.iter().any(|r| r.author_id == rating.author_id) {
            return Err(AppError::Conflict(
                "Author already rated this ride".to_string(),
            ));
        }
        slot.ratings.push(rating.clone());
        Ok(())
    }

    async fn rating_totals(&mut self, target_id: Uuid, role: Role) -> AppResult<(i64, i64)> {
        let (sum, count) = self
            .all_slots()?
            .iter()
            .flat_map(|slot| slot.ratings.iter())
            .filter(|r| r.target_id == target_id && r.target_role == role)
            .fold((0i64, 0i64), |(sum, count), r| (sum + i64::from(r.rate), count + 1));
        Ok((sum, count))
    }

    async fn commit(mut self: Box<Self>) -> AppResult<()> {
        let inner = Arc::clone(&self.inner);
        {
            let mut tables = inner
                .tables
                .write()
                .map_err(|_| internal_error("memory store poisoned"))?;

            // Otra transacción pudo publicar la misma dirección mientras tanto
            if let Some(taken) = self.staged_addresses.iter().find(|a| tables.address_taken(a)) {
                return Err(address_conflict(taken));
            }

            for address in std::mem::take(&mut self.staged_addresses) {
                tables.addresses.insert(address.id, address);
            }
            for (ride_id, slot) in std::mem::take(&mut self.staged) {
                tables.rides.insert(ride_id, slot);
            }
        }
        debug!("💾 Transacción en memoria publicada ({} bloqueos liberados)", self.held.len());
        Ok(())
    }
}

impl Drop for MemoryRideTx {
    /// Soltar los bloqueos y olvidar las claves que nadie más espera
    fn drop(&mut self) {
        if self.held.is_empty() {
            return;
        }
        let keys: Vec<Uuid> = self.held.keys().copied().collect();
        self.held.clear();

        let Ok(mut locks) = self.inner.locks.lock() else {
            return;
        };
        for key in keys {
            if locks.get(&key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
                locks.remove(&key);
            }
        }
    }
}
