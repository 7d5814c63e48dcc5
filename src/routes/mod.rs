//! Rutas HTTP
//!
//! `create_router` monta todas las rutas de la API sobre el estado compartido.

pub mod address_routes;
pub mod ride_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_middleware;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = cors_middleware(&state.config);

    Router::new()
        .route("/health", get(health))
        .nest("/api/rides", ride_routes::create_ride_router())
        .nest("/api/stops", ride_routes::create_stop_router())
        .nest("/api/users", ride_routes::create_user_router())
        .nest("/api/addresses", address_routes::create_address_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
