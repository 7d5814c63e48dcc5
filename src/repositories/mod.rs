//! Repositorios
//!
//! Interfaz de persistencia del motor de viajes y sus implementaciones:
//! PostgreSQL para producción y memoria para desarrollo y tests.

pub mod memory_ride_store;
pub mod pg_ride_store;
pub mod ride_store;

pub use memory_ride_store::MemoryRideStore;
pub use pg_ride_store::PgRideStore;
pub use ride_store::{RideStore, RideTx};
