//! Proyección de estado
//!
//! El estado de un viaje nunca se guarda: se calcula en cada lectura a partir
//! del conductor, la primera parada y la fecha de cierre.

use crate::models::{Ride, RideStatus, Stop};

/// Precedencia: conductor → primera parada → cierre del viaje
pub fn derive_status(ride: &Ride, stops: &[Stop]) -> RideStatus {
    if ride.driver_id.is_none() {
        return RideStatus::SearchingDriver;
    }

    let first_completed = stops
        .iter()
        .filter(|s| s.order == 0)
        .min_by_key(|s| s.date_created)
        .map_or(false, |s| !s.is_pending());

    if !first_completed {
        RideStatus::WaitingDriver
    } else if ride.is_open() {
        RideStatus::InProgress
    } else {
        RideStatus::Completed
    }
}
