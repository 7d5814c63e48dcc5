//! Utilidades de validación
//!
//! Funciones helper para validar la entrada de los viajes antes de tocar
//! la base de datos.

use std::borrow::Cow;
use std::collections::HashSet;

use uuid::Uuid;
use validator::ValidationError;

use crate::models::rating::MAX_RATE;
use crate::utils::errors::{validation_error, AppError};

/// Mínimo de paradas con las que se crea un viaje (origen y destino)
pub const MIN_INITIAL_STOPS: usize = 2;

fn with_message(mut error: ValidationError, message: String) -> ValidationError {
    error.message = Some(Cow::from(message));
    error
}

/// Validar la lista inicial de paradas: al menos dos (origen y destino)
pub fn validate_stop_list(addresses: &[Uuid]) -> Result<(), ValidationError> {
    if addresses.len() < MIN_INITIAL_STOPS {
        let mut error = ValidationError::new("min_stops");
        error.add_param("min".into(), &MIN_INITIAL_STOPS);
        error.add_param("actual".into(), &addresses.len());
        return Err(with_message(
            error,
            format!(
                "At least {} addresses but {} given.",
                MIN_INITIAL_STOPS,
                addresses.len()
            ),
        ));
    }
    Ok(())
}

/// Primera dirección repetida de la lista, si la hay
pub fn first_duplicate(addresses: &[Uuid]) -> Option<Uuid> {
    let mut seen = HashSet::with_capacity(addresses.len());
    addresses.iter().copied().find(|address| !seen.insert(*address))
}

/// Validar la calificación: entero entre 0 y 5
pub fn validate_rate(rate: i32) -> Result<(), ValidationError> {
    if !(0..=MAX_RATE).contains(&rate) {
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &0);
        error.add_param("max".into(), &MAX_RATE);
        error.add_param("actual".into(), &rate);
        return Err(with_message(error, format!("Rate must be between 0 and {}", MAX_RATE)));
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let error = ValidationError::new("not_empty");
        return Err(with_message(error, "Value must not be empty".to_string()));
    }
    Ok(())
}

/// Validar una parte de la dirección: no vacía y de a lo sumo `max` caracteres
pub fn validate_address_part(value: &str, max: usize) -> Result<(), ValidationError> {
    validate_not_empty(value)?;
    let length = value.chars().count();
    if length > max {
        let mut error = ValidationError::new("length");
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &length);
        return Err(with_message(
            error,
            format!("Value must be at most {} characters but {} given", max, length),
        ));
    }
    Ok(())
}

/// Convertir un `ValidationError` en el error de dominio
pub fn to_app_error(error: ValidationError) -> AppError {
    match error.message {
        Some(message) => validation_error(message),
        None => validation_error(error.code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_stop_list() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert!(validate_stop_list(&[a, b]).is_ok());
        assert!(validate_stop_list(&[a]).is_err());
        assert!(validate_stop_list(&[]).is_err());
    }

    #[test]
    fn test_validate_address_part() {
        assert!(validate_address_part("12к3", 10).is_ok());
        assert!(validate_address_part("  ", 10).is_err());
        assert!(validate_address_part("Строение 112", 10).is_err());
    }

    #[test]
    fn test_first_duplicate() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert_eq!(first_duplicate(&[a, b]), None);
        assert_eq!(first_duplicate(&[a, b, a]), Some(a));
    }

    #[test]
    fn test_stop_list_error_message() {
        let err = validate_stop_list(&[Uuid::new_v4()]).unwrap_err();
        match to_app_error(err) {
            AppError::Validation(msg) => assert_eq!(msg, "At least 2 addresses but 1 given."),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate(0).is_ok());
        assert!(validate_rate(5).is_ok());
        assert!(validate_rate(6).is_err());
        assert!(validate_rate(-1).is_err());
    }

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("Great ride").is_ok());
        assert!(validate_not_empty("   ").is_err());
    }
}
