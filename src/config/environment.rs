//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Las variables ausentes o
//! inválidas devuelven un `ConfigError` en lugar de abortar el proceso.

use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Precio fijo por defecto de un viaje
pub const DEFAULT_FLAT_PRICE: i64 = 1337;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub database_url: Option<String>,
    pub ride_flat_price: Decimal,
    pub available_rides_limit: i64,
}

impl EnvironmentConfig {
    /// Leer la configuración desde el entorno del proceso
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Leer la configuración desde una función de búsqueda arbitraria
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            environment: or_default("ENVIRONMENT", "development"),
            port: parse("PORT", or_default("PORT", "3000"))?,
            host: or_default("HOST", "0.0.0.0"),
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration: parse("JWT_EXPIRATION", or_default("JWT_EXPIRATION", "86400"))?,
            cors_origins: lookup("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            ride_flat_price: parse(
                "RIDE_FLAT_PRICE",
                or_default("RIDE_FLAT_PRICE", &DEFAULT_FLAT_PRICE.to_string()),
            )?,
            available_rides_limit: parse(
                "AVAILABLE_RIDES_LIMIT",
                or_default("AVAILABLE_RIDES_LIMIT", "100"),
            )?,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EnvironmentConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert!(config.is_development());
        assert_eq!(config.port, 3000);
        assert_eq!(config.server_url(), "0.0.0.0:3000");
        assert_eq!(config.database_url, None);
        assert_eq!(config.ride_flat_price, Decimal::from(DEFAULT_FLAT_PRICE));
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_missing_secret() {
        let err = EnvironmentConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn test_invalid_port() {
        let err = EnvironmentConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn test_overrides() {
        let config = EnvironmentConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("ENVIRONMENT", "production"),
            ("CORS_ORIGINS", "https://taxi.ru, https://admin.taxi.ru"),
            ("DATABASE_URL", "postgres://taxi@localhost/taxi"),
            ("RIDE_FLAT_PRICE", "250.50"),
        ]))
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.cors_origins, vec!["https://taxi.ru", "https://admin.taxi.ru"]);
        assert_eq!(config.database_url.as_deref(), Some("postgres://taxi@localhost/taxi"));
        assert_eq!(config.ride_flat_price, Decimal::new(25050, 2));
    }
}
