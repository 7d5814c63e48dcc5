//! Modelo de Stop (entrada de la cola de direcciones de un viaje)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Parada - mapea a la tabla ride_stops
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Stop {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub address_id: Uuid,
    /// Posición en la cola, 0-based y densa dentro del viaje
    #[sqlx(rename = "queue_order")]
    pub order: i32,
    pub date_created: DateTime<Utc>,
    pub date_ended: Option<DateTime<Utc>>,
}

impl Stop {
    pub fn new(ride_id: Uuid, address_id: Uuid, order: i32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            ride_id,
            address_id,
            order,
            date_created: now,
            date_ended: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.date_ended.is_none()
    }
}
