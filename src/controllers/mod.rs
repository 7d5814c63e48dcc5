//! Controladores
//!
//! Traducen los DTOs de la API a llamadas de los servicios y de vuelta.

pub mod address_controller;
pub mod ride_controller;

pub use address_controller::AddressController;
pub use ride_controller::RideController;
