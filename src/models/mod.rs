//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema PostgreSQL
//! del motor de viajes y a la identidad de quien llama.

pub mod address;
pub mod identity;
pub mod rating;
pub mod ride;
pub mod stop;

pub use address::Address;
pub use identity::{Caller, Role};
pub use rating::Rating;
pub use ride::{Ride, RideStatus};
pub use stop::Stop;
