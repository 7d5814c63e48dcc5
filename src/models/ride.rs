//! Modelo de Ride
//!
//! Mapea la tabla rides. El estado del viaje no se almacena: se deriva
//! en cada lectura (ver `services::status`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Viaje - mapea exactamente a la tabla rides
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Ride {
    pub id: Uuid,
    pub consumer_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub date_created: DateTime<Utc>,
    pub date_ended: Option<DateTime<Utc>>,
}

impl Ride {
    pub fn new(consumer_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            consumer_id,
            driver_id: None,
            date_created: now,
            date_ended: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.date_ended.is_none()
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.consumer_id == user_id || self.driver_id == Some(user_id)
    }
}

/// Estado derivado del viaje
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RideStatus {
    #[serde(rename = "Searching driver")]
    SearchingDriver,
    #[serde(rename = "Waiting driver")]
    WaitingDriver,
    #[serde(rename = "In progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::SearchingDriver => "Searching driver",
            RideStatus::WaitingDriver => "Waiting driver",
            RideStatus::InProgress => "In progress",
            RideStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for RideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
