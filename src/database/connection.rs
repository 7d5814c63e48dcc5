//! Conexión a PostgreSQL
//!
//! Este módulo crea el pool y aplica las migraciones del schema de viajes.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::config::database::DatabaseConfig;

/// Crear el pool y dejar el schema al día
pub async fn connect_and_migrate(config: &DatabaseConfig) -> Result<PgPool> {
    info!("🔗 Conectando a PostgreSQL: {}", mask_database_url(&config.url));

    let pool = config.create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("✅ Migraciones aplicadas");
    Ok(pool)
}

/// Función helper para enmascarar la URL de la base de datos en logs
fn mask_database_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
