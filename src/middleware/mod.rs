//! Middleware del sistema
//!
//! Este módulo contiene la extracción de la identidad de quien llama y la
//! configuración de CORS.

pub mod auth;
pub mod cors;

pub use cors::*;
