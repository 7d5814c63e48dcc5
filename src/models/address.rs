//! Modelo de Address
//!
//! Las direcciones son compartidas entre viajes: una parada solo las referencia
//! y nunca se eliminan junto con el viaje.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const MAX_PLACE_LENGTH: usize = 511;
pub const MAX_NAME_LENGTH: usize = 10;

/// Dirección con su jerarquía geográfica (ciudad → distrito → calle → número)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Address {
    pub id: Uuid,
    pub city: String,
    pub district: String,
    pub street: String,
    pub name: String,
}

impl Address {
    pub fn new(city: &str, district: &str, street: &str, name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            city: city.to_string(),
            district: district.to_string(),
            street: street.to_string(),
            name: name.to_string(),
        }
    }

    /// Etiqueta completa, de lo general a lo particular
    pub fn full_address(&self) -> String {
        format!("{} {} {} {}", self.city, self.district, self.street, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_address() {
        let address = Address::new("Москва", "Останкинский", "Павла Корчагина", "7");
        assert_eq!(address.full_address(), "Москва Останкинский Павла Корчагина 7");
    }
}
