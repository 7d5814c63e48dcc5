//! Interfaz de persistencia de viajes y paradas
//!
//! Toda operación del motor ocurre dentro de una transacción (`RideTx`).
//! Una transacción que se descarta sin `commit` se revierte por completo.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Address, Rating, Ride, Role, Stop};
use crate::utils::errors::AppResult;

/// Fuente de transacciones
#[async_trait]
pub trait RideStore: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn RideTx>>;
}

/// Operaciones disponibles dentro de una transacción
#[async_trait]
pub trait RideTx: Send {
    /// Bloquear el viaje hasta el fin de la transacción y devolverlo
    async fn lock_ride(&mut self, ride_id: Uuid) -> AppResult<Option<Ride>>;

    /// Bloquear a un participante (pasajero o conductor) hasta el fin de la transacción
    async fn lock_participant(&mut self, user_id: Uuid) -> AppResult<()>;

    async fn find_ride(&mut self, ride_id: Uuid) -> AppResult<Option<Ride>>;

    /// Viaje abierto donde el usuario es pasajero o conductor
    async fn find_open_ride_for(&mut self, user_id: Uuid) -> AppResult<Option<Ride>>;

    /// Viajes abiertos sin conductor, los más recientes primero
    async fn list_available_rides(&mut self, limit: i64) -> AppResult<Vec<Ride>>;

    async fn insert_ride(&mut self, ride: &Ride) -> AppResult<()>;

    /// Escritura condicional: asigna el conductor solo si el viaje sigue sin uno.
    /// Devuelve `false` si otro conductor ya lo tenía.
    async fn assign_driver(&mut self, ride_id: Uuid, driver_id: Uuid) -> AppResult<bool>;

    async fn close_ride(&mut self, ride_id: Uuid, ended_at: DateTime<Utc>) -> AppResult<bool>;

    /// Paradas del viaje ordenadas por `order` ascendente (desempate por `date_created`)
    async fn stops_for_ride(&mut self, ride_id: Uuid) -> AppResult<Vec<Stop>>;

    async fn find_stop(&mut self, stop_id: Uuid) -> AppResult<Option<Stop>>;

    async fn insert_stop(&mut self, stop: &Stop) -> AppResult<()>;

    async fn complete_stop(&mut self, stop_id: Uuid, ended_at: DateTime<Utc>) -> AppResult<bool>;

    async fn set_stop_order(&mut self, stop_id: Uuid, order: i32) -> AppResult<()>;

    async fn delete_stop(&mut self, stop_id: Uuid) -> AppResult<bool>;

    async fn find_addresses(&mut self, ids: &[Uuid]) -> AppResult<Vec<Address>>;

    /// Registrar una dirección. Ciudad, distrito, calle y número son únicos juntos.
    async fn insert_address(&mut self, address: &Address) -> AppResult<()>;

    /// Direcciones ordenadas de lo general a lo particular
    async fn list_addresses(&mut self, limit: i64) -> AppResult<Vec<Address>>;

    async fn insert_rating(&mut self, rating: &Rating) -> AppResult<()>;

    /// Suma y cantidad de calificaciones recibidas por un usuario en un rol
    async fn rating_totals(&mut self, target_id: Uuid, role: Role) -> AppResult<(i64, i64)>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}
