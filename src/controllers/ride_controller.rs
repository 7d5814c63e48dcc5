use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    AddStopRequest, ApiResponse, CompletionResponse, CreateRideRequest, RateRideRequest, RatingResponse,
    RideResponse, StopResponse, UserRatingResponse,
};
use crate::models::{Caller, Role, Stop};
use crate::services::{AddressService, CompletionOutcome, RatingService, RideService, StopQueueEngine};
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, AppError};

pub struct RideController {
    rides: RideService,
    queue: StopQueueEngine,
    ratings: RatingService,
    addresses: AddressService,
}

impl RideController {
    pub fn new(state: &AppState) -> Self {
        Self {
            rides: state.rides.clone(),
            queue: state.queue.clone(),
            ratings: state.ratings.clone(),
            addresses: state.addresses.clone(),
        }
    }

    /// Solo un pasajero abre un viaje, y solo para sí mismo
    pub async fn create(&self, caller: Caller, request: CreateRideRequest) -> Result<ApiResponse<RideResponse>, AppError> {
        request.validate()?;

        let consumer_id = caller
            .consumer_id()
            .ok_or_else(|| forbidden_error("create ride", "caller is not a consumer"))?;
        if request.consumer.is_some_and(|consumer| consumer != consumer_id) {
            return Err(forbidden_error("create ride", "consumer does not match the caller"));
        }

        let view = self
            .rides
            .create_ride(Some(&caller), None, request.addresses)
            .await?;

        Ok(ApiResponse::success_with_message(RideResponse::from(view), "Ride created"))
    }

    pub async fn available(&self, caller: Caller) -> Result<ApiResponse<Vec<RideResponse>>, AppError> {
        if caller.driver_id().is_none() {
            return Err(forbidden_error("list available rides", "caller is not a driver"));
        }

        let rides = self.rides.available_rides().await?;
        Ok(ApiResponse::success(rides.into_iter().map(RideResponse::from).collect()))
    }

    pub async fn current(&self, caller: Caller) -> Result<ApiResponse<RideResponse>, AppError> {
        let view = self.rides.current_ride(caller.user_id).await?;
        Ok(ApiResponse::success(RideResponse::from(view)))
    }

    pub async fn get(&self, ride_id: Uuid) -> Result<ApiResponse<RideResponse>, AppError> {
        let view = self.rides.get_ride(ride_id).await?;
        Ok(ApiResponse::success(RideResponse::from(view)))
    }

    pub async fn accept(&self, ride_id: Uuid, caller: Caller) -> Result<ApiResponse<RideResponse>, AppError> {
        let driver_id = caller
            .driver_id()
            .ok_or_else(|| forbidden_error("accept ride", "caller is not a driver"))?;

        let view = self.rides.accept_ride(ride_id, driver_id).await?;
        Ok(ApiResponse::success_with_message(RideResponse::from(view), "Ride accepted"))
    }

    /// 200 si se completó una parada, 208 si ya no quedaba ninguna
    pub async fn complete_address(
        &self,
        ride_id: Uuid,
        caller: Caller,
    ) -> Result<(StatusCode, ApiResponse<CompletionResponse>), AppError> {
        let outcome = self.queue.complete_next_stop_as(ride_id, &caller).await?;
        let view = self.rides.get_ride(ride_id).await?;

        let (status, completed, ride_closed, message) = match outcome {
            CompletionOutcome::Completed { stop, ride_closed } => {
                let completed = StopResponse::labeled(&stop, view.address_of(&stop));
                (StatusCode::OK, Some(completed), ride_closed, "Stop completed")
            }
            CompletionOutcome::AlreadyCompleted => {
                (StatusCode::ALREADY_REPORTED, None, false, "All stops already completed")
            }
        };

        let body = CompletionResponse {
            completed,
            ride_closed,
            ride: RideResponse::from(view),
        };
        Ok((status, ApiResponse::success_with_message(body, message)))
    }

    pub async fn add_stop(
        &self,
        ride_id: Uuid,
        caller: Caller,
        request: AddStopRequest,
    ) -> Result<ApiResponse<RideResponse>, AppError> {
        self.queue.add_stop_as(ride_id, request.address, &caller).await?;
        let view = self.rides.get_ride(ride_id).await?;
        Ok(ApiResponse::success_with_message(RideResponse::from(view), "Stop added"))
    }

    pub async fn pending(&self, ride_id: Uuid) -> Result<ApiResponse<Vec<StopResponse>>, AppError> {
        let queue = self.queue.list_pending(ride_id).await?;
        let pending = self.labeled(queue.pending()).await?;
        Ok(ApiResponse::success(pending))
    }

    pub async fn delete_stop(&self, stop_id: Uuid, caller: Caller) -> Result<ApiResponse<Vec<StopResponse>>, AppError> {
        let queue = self.queue.delete_stop_as(stop_id, &caller).await?;
        let stops = self.labeled(queue.stops().iter()).await?;
        Ok(ApiResponse::success_with_message(stops, "Stop deleted"))
    }

    pub async fn rate(
        &self,
        ride_id: Uuid,
        caller: Caller,
        request: RateRideRequest,
    ) -> Result<ApiResponse<RatingResponse>, AppError> {
        request.validate()?;

        let rating = self
            .ratings
            .rate_ride(ride_id, &caller, request.rate, request.comment)
            .await?;
        Ok(ApiResponse::success_with_message(RatingResponse::from(rating), "Rating saved"))
    }

    async fn labeled<'a>(&self, stops: impl Iterator<Item = &'a Stop>) -> Result<Vec<StopResponse>, AppError> {
        let stops: Vec<&Stop> = stops.collect();
        let ids: Vec<Uuid> = stops.iter().map(|s| s.address_id).collect();
        let labels = self.addresses.labels(&ids).await?;
        Ok(stops
            .into_iter()
            .map(|stop| StopResponse::labeled(stop, labels.get(&stop.address_id)))
            .collect())
    }

    pub async fn user_rating(&self, user_id: Uuid, role: Role) -> Result<ApiResponse<UserRatingResponse>, AppError> {
        let average_rating = self.ratings.average_rating(user_id, role).await?;
        Ok(ApiResponse::success(UserRatingResponse {
            user: user_id,
            role,
            average_rating,
        }))
    }
}
