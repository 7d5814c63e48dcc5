//! DTOs de la API
//!
//! Requests validados con `validator` y responses serializados con `serde`.

pub mod address_dto;
pub mod api_response;
pub mod ride_dto;

pub use address_dto::{AddressResponse, CreateAddressRequest};
pub use api_response::ApiResponse;
pub use ride_dto::*;
