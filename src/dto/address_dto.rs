use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::Address;

// Request para registrar una dirección
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAddressRequest {
    #[validate(length(min = 1, max = 511))]
    pub city: String,
    #[validate(length(min = 1, max = 511))]
    pub district: String,
    #[validate(length(min = 1, max = 511))]
    pub street: String,
    #[validate(length(min = 1, max = 10, message = "House number must be 1 to 10 characters"))]
    pub name: String,
}

// Response de dirección
#[derive(Debug, Serialize, Deserialize)]
pub struct AddressResponse {
    pub id: Uuid,
    pub city: String,
    pub district: String,
    pub street: String,
    pub name: String,
    pub full_address: String,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            full_address: address.full_address(),
            id: address.id,
            city: address.city,
            district: address.district,
            street: address.street,
            name: address.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_address_request_validation() {
        let ok = CreateAddressRequest {
            city: "Москва".to_string(),
            district: "Арбат".to_string(),
            street: "Арбат".to_string(),
            name: "10".to_string(),
        };
        assert!(ok.validate().is_ok());

        let long_name = CreateAddressRequest {
            name: "10 строение 2".to_string(),
            ..ok
        };
        assert!(long_name.validate().is_err());
    }
}
