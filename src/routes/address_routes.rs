use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::AddressController;
use crate::dto::{AddressResponse, ApiResponse, CreateAddressRequest};
use crate::models::Caller;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_address_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_addresses).post(create_address))
        .route("/:id", get(get_address))
}

async fn create_address(
    State(state): State<AppState>,
    _caller: Caller,
    Json(request): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AddressResponse>>), AppError> {
    let response = AddressController::new(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_addresses(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<AddressResponse>>>, AppError> {
    let response = AddressController::new(&state).list().await?;
    Ok(Json(response))
}

async fn get_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AddressResponse>>, AppError> {
    let response = AddressController::new(&state).get(id).await?;
    Ok(Json(response))
}
