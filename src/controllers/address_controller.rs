use uuid::Uuid;
use validator::Validate;

use crate::dto::{AddressResponse, ApiResponse, CreateAddressRequest};
use crate::services::AddressService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct AddressController {
    addresses: AddressService,
}

impl AddressController {
    pub fn new(state: &AppState) -> Self {
        Self {
            addresses: state.addresses.clone(),
        }
    }

    pub async fn create(&self, request: CreateAddressRequest) -> Result<ApiResponse<AddressResponse>, AppError> {
        request.validate()?;

        let address = self
            .addresses
            .create_address(&request.city, &request.district, &request.street, &request.name)
            .await?;
        Ok(ApiResponse::success_with_message(AddressResponse::from(address), "Address created"))
    }

    pub async fn get(&self, address_id: Uuid) -> Result<ApiResponse<AddressResponse>, AppError> {
        let address = self.addresses.get_address(address_id).await?;
        Ok(ApiResponse::success(AddressResponse::from(address)))
    }

    pub async fn list(&self) -> Result<ApiResponse<Vec<AddressResponse>>, AppError> {
        let addresses = self.addresses.list_addresses().await?;
        Ok(ApiResponse::success(addresses.into_iter().map(AddressResponse::from).collect()))
    }
}
