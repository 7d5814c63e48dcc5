use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Address, Rating, RideStatus, Role, Stop};
use crate::services::RideView;
use crate::utils::validation::validate_stop_list;

// Request para crear un viaje
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRideRequest {
    /// Si viene, debe ser quien llama
    pub consumer: Option<Uuid>,
    #[validate(custom = "validate_stop_list")]
    pub addresses: Vec<Uuid>,
}

// Request para añadir una parada al final de la cola
#[derive(Debug, Deserialize)]
pub struct AddStopRequest {
    pub address: Uuid,
}

// Request para calificar a la contraparte del viaje
#[derive(Debug, Deserialize, Validate)]
pub struct RateRideRequest {
    #[validate(range(min = 0, max = 5))]
    pub rate: i32,
    #[validate(length(min = 1, message = "Comment must not be empty"))]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct RatingQuery {
    pub role: Role,
}

// Parada con la etiqueta de su dirección
#[derive(Debug, Serialize, Deserialize)]
pub struct StopResponse {
    pub id: Uuid,
    pub ride: Uuid,
    pub address: Uuid,
    pub name: Option<String>,
    pub full_address: Option<String>,
    pub order: i32,
    pub date_created: DateTime<Utc>,
    pub date_ended: Option<DateTime<Utc>>,
}

impl StopResponse {
    pub fn labeled(stop: &Stop, address: Option<&Address>) -> Self {
        Self {
            id: stop.id,
            ride: stop.ride_id,
            address: stop.address_id,
            name: address.map(|a| a.name.clone()),
            full_address: address.map(|a| a.full_address()),
            order: stop.order,
            date_created: stop.date_created,
            date_ended: stop.date_ended,
        }
    }
}

// Viaje con sus paradas, estado derivado y precio
#[derive(Debug, Serialize, Deserialize)]
pub struct RideResponse {
    pub id: Uuid,
    pub consumer: Uuid,
    pub driver: Option<Uuid>,
    pub addresses: Vec<StopResponse>,
    pub status: RideStatus,
    pub price: Decimal,
    pub date_created: DateTime<Utc>,
    pub date_ended: Option<DateTime<Utc>>,
}

impl From<&RideView> for RideResponse {
    fn from(view: &RideView) -> Self {
        Self {
            id: view.ride.id,
            consumer: view.ride.consumer_id,
            driver: view.ride.driver_id,
            addresses: view
                .queue
                .stops()
                .iter()
                .map(|stop| StopResponse::labeled(stop, view.address_of(stop)))
                .collect(),
            status: view.status,
            price: view.price,
            date_created: view.ride.date_created,
            date_ended: view.ride.date_ended,
        }
    }
}

impl From<RideView> for RideResponse {
    fn from(view: RideView) -> Self {
        Self::from(&view)
    }
}

// Resultado de completar la siguiente parada
#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub completed: Option<StopResponse>,
    pub ride_closed: bool,
    pub ride: RideResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RatingResponse {
    pub id: Uuid,
    pub ride: Uuid,
    pub author: Uuid,
    pub target: Uuid,
    pub target_role: Role,
    pub rate: i32,
    pub comment: String,
    pub date_created: DateTime<Utc>,
}

impl From<Rating> for RatingResponse {
    fn from(rating: Rating) -> Self {
        Self {
            id: rating.id,
            ride: rating.ride_id,
            author: rating.author_id,
            target: rating.target_id,
            target_role: rating.target_role,
            rate: rating.rate,
            comment: rating.comment,
            date_created: rating.date_created,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserRatingResponse {
    pub user: Uuid,
    pub role: Role,
    pub average_rating: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ride_request_validation() {
        let ok = CreateRideRequest {
            consumer: None,
            addresses: vec![Uuid::new_v4(), Uuid::new_v4()],
        };
        assert!(ok.validate().is_ok());

        let too_short = CreateRideRequest {
            consumer: None,
            addresses: vec![Uuid::new_v4()],
        };
        assert!(too_short.validate().is_err());
    }

    #[test]
    fn test_stop_response_carries_address_label() {
        let address = Address::new("Москва", "Арбат", "Арбат", "10");
        let stop = Stop::new(Uuid::new_v4(), address.id, 0, Utc::now());

        let labeled = StopResponse::labeled(&stop, Some(&address));
        assert_eq!(labeled.full_address.as_deref(), Some("Москва Арбат Арбат 10"));
        assert_eq!(labeled.name.as_deref(), Some("10"));

        let unlabeled = StopResponse::labeled(&stop, None);
        assert!(unlabeled.full_address.is_none());
    }

    #[test]
    fn test_rate_request_validation() {
        let ok = RateRideRequest { rate: 5, comment: "Great".to_string() };
        assert!(ok.validate().is_ok());

        let out_of_range = RateRideRequest { rate: 6, comment: "Great".to_string() };
        assert!(out_of_range.validate().is_err());

        let empty = RateRideRequest { rate: 3, comment: String::new() };
        assert!(empty.validate().is_err());
    }
}
