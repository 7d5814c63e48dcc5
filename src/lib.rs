//! Motor de despacho de taxis
//!
//! Un viaje lleva una cola ordenada de paradas que se completan una a una;
//! completar la última cierra el viaje y el estado se deriva en cada lectura.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
