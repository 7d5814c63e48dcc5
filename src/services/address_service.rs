//! Direcciones compartidas entre viajes

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::models::address::{MAX_NAME_LENGTH, MAX_PLACE_LENGTH};
use crate::models::Address;
use crate::repositories::RideStore;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::validation::{to_app_error, validate_address_part};

const ADDRESS_LIST_LIMIT: i64 = 500;

#[derive(Clone)]
pub struct AddressService {
    store: Arc<dyn RideStore>,
}

impl AddressService {
    pub fn new(store: Arc<dyn RideStore>) -> Self {
        Self { store }
    }

    /// Registrar una dirección; repetir ciudad, distrito, calle y número es un conflicto
    pub async fn create_address(&self, city: &str, district: &str, street: &str, name: &str) -> AppResult<Address> {
        let (city, district, street, name) = (city.trim(), district.trim(), street.trim(), name.trim());
        for part in [city, district, street] {
            validate_address_part(part, MAX_PLACE_LENGTH).map_err(to_app_error)?;
        }
        validate_address_part(name, MAX_NAME_LENGTH).map_err(to_app_error)?;

        let address = Address::new(city, district, street, name);
        let mut tx = self.store.begin().await?;
        tx.insert_address(&address).await?;
        tx.commit().await?;

        info!("📍 Dirección {} registrada: {}", address.id, address.full_address());
        Ok(address)
    }

    pub async fn get_address(&self, address_id: Uuid) -> AppResult<Address> {
        let mut tx = self.store.begin().await?;
        tx.find_addresses(&[address_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| not_found_error("Address", &address_id.to_string()))
    }

    pub async fn list_addresses(&self) -> AppResult<Vec<Address>> {
        let mut tx = self.store.begin().await?;
        tx.list_addresses(ADDRESS_LIST_LIMIT).await
    }

    /// Direcciones por id, para etiquetar paradas
    pub async fn labels(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Address>> {
        let mut tx = self.store.begin().await?;
        Ok(tx
            .find_addresses(ids)
            .await?
            .into_iter()
            .map(|address| (address.id, address))
            .collect())
    }
}
