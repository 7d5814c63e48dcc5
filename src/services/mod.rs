//! Services module
//!
//! Este módulo contiene la lógica de negocio: la cola de paradas, la
//! proyección de estado, el precio, las calificaciones y las direcciones.

pub mod address_service;
pub mod pricing;
pub mod rating_service;
pub mod ride_service;
pub mod status;
pub mod stop_queue;

pub use address_service::AddressService;
pub use pricing::{FlatRatePricing, PricingPolicy};
pub use rating_service::RatingService;
pub use ride_service::{RideService, RideView};
pub use status::derive_status;
pub use stop_queue::{CompletionOutcome, PendingStops, StopQueue, StopQueueEngine};
