use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use taxi_dispatch::config::database::DatabaseConfig;
use taxi_dispatch::config::EnvironmentConfig;
use taxi_dispatch::database::connect_and_migrate;
use taxi_dispatch::repositories::{MemoryRideStore, PgRideStore, RideStore};
use taxi_dispatch::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚕 Taxi Dispatch - motor de viajes");
    info!("==================================");

    let config = match EnvironmentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Configuración inválida: {}", e);
            return Err(e.into());
        }
    };

    info!("⚙️ Entorno: {}", config.environment);
    if config.is_production() && config.database_url.is_none() {
        warn!("⚠️ Producción sin DATABASE_URL: los viajes no sobrevivirán a un reinicio");
    }

    let store: Arc<dyn RideStore> = match &config.database_url {
        Some(url) => {
            let pool = match connect_and_migrate(&DatabaseConfig::new(url.as_str())).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                }
            };
            Arc::new(PgRideStore::new(pool))
        }
        None => {
            warn!("⚠️ DATABASE_URL no definida: usando almacén en memoria");
            Arc::new(MemoryRideStore::new())
        }
    };

    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_router(AppState::new(config, store));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET    /health");
    info!("   POST   /api/rides - Crear viaje");
    info!("   GET    /api/rides/available - Viajes sin conductor");
    info!("   GET    /api/rides/current - Viaje actual");
    info!("   GET    /api/rides/:id - Obtener viaje");
    info!("   POST   /api/rides/:id/accept - Aceptar viaje");
    info!("   POST   /api/rides/:id/complete_address - Completar siguiente parada");
    info!("   POST   /api/rides/:id/addresses - Añadir parada");
    info!("   GET    /api/rides/:id/addresses/pending - Paradas pendientes");
    info!("   POST   /api/rides/:id/rate - Calificar");
    info!("   DELETE /api/stops/:id - Eliminar parada");
    info!("   GET    /api/users/:id/rating?role= - Calificación media");
    info!("   POST   /api/addresses - Registrar dirección");
    info!("   GET    /api/addresses - Listar direcciones");
    info!("   GET    /api/addresses/:id - Obtener dirección");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo escuchar SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
