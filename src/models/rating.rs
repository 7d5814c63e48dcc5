//! Modelo de Rating
//!
//! Un participante del viaje califica a su contraparte: el pasajero al
//! conductor y el conductor al pasajero.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Role;

pub const MAX_RATE: i32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Rating {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub author_id: Uuid,
    pub target_id: Uuid,
    pub target_role: Role,
    pub rate: i32,
    pub comment: String,
    pub date_created: DateTime<Utc>,
}

/// Promedio con dos decimales; 0 cuando no hay calificaciones
pub fn average_rating(sum: i64, count: i64) -> Decimal {
    if count <= 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(sum) / Decimal::from(count)).round_dp(2)
}
