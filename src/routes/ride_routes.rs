use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::RideController;
use crate::dto::{
    AddStopRequest, ApiResponse, CompletionResponse, CreateRideRequest, RateRideRequest, RatingQuery,
    RatingResponse, RideResponse, StopResponse, UserRatingResponse,
};
use crate::models::Caller;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_ride_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_ride))
        .route("/available", get(available_rides))
        .route("/current", get(current_ride))
        .route("/:id", get(get_ride))
        .route("/:id/accept", post(accept_ride))
        .route("/:id/complete_address", post(complete_address))
        .route("/:id/addresses", post(add_stop))
        .route("/:id/addresses/pending", get(pending_stops))
        .route("/:id/rate", post(rate_ride))
}

pub fn create_stop_router() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_stop))
}

pub fn create_user_router() -> Router<AppState> {
    Router::new().route("/:id/rating", get(user_rating))
}

async fn create_ride(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CreateRideRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RideResponse>>), AppError> {
    let response = RideController::new(&state).create(caller, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn available_rides(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ApiResponse<Vec<RideResponse>>>, AppError> {
    let response = RideController::new(&state).available(caller).await?;
    Ok(Json(response))
}

async fn current_ride(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ApiResponse<RideResponse>>, AppError> {
    let response = RideController::new(&state).current(caller).await?;
    Ok(Json(response))
}

async fn get_ride(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _caller: Caller,
) -> Result<Json<ApiResponse<RideResponse>>, AppError> {
    let response = RideController::new(&state).get(id).await?;
    Ok(Json(response))
}

async fn accept_ride(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    caller: Caller,
) -> Result<Json<ApiResponse<RideResponse>>, AppError> {
    let response = RideController::new(&state).accept(id, caller).await?;
    Ok(Json(response))
}

async fn complete_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    caller: Caller,
) -> Result<(StatusCode, Json<ApiResponse<CompletionResponse>>), AppError> {
    let (status, response) = RideController::new(&state).complete_address(id, caller).await?;
    Ok((status, Json(response)))
}

async fn add_stop(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    caller: Caller,
    Json(request): Json<AddStopRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RideResponse>>), AppError> {
    let response = RideController::new(&state).add_stop(id, caller, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn pending_stops(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _caller: Caller,
) -> Result<Json<ApiResponse<Vec<StopResponse>>>, AppError> {
    let response = RideController::new(&state).pending(id).await?;
    Ok(Json(response))
}

async fn delete_stop(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    caller: Caller,
) -> Result<Json<ApiResponse<Vec<StopResponse>>>, AppError> {
    let response = RideController::new(&state).delete_stop(id, caller).await?;
    Ok(Json(response))
}

async fn rate_ride(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    caller: Caller,
    Json(request): Json<RateRideRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RatingResponse>>), AppError> {
    let response = RideController::new(&state).rate(id, caller, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn user_rating(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<RatingQuery>,
) -> Result<Json<ApiResponse<UserRatingResponse>>, AppError> {
    let response = RideController::new(&state).user_rating(id, query.role).await?;
    Ok(Json(response))
}
