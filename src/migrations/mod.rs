// Migration orchestrator
// Embedded in the application binary so deployments need no migration tooling

pub mod diesel;

use crate::app_config::{AppConfig, StoreBackend};
use std::error::Error;
use tracing::{error, info};

/// Run the embedded migrations for the configured store backend
pub async fn run_all_migrations(config: &AppConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    if !should_run_migrations(config) {
        info!("[MIGRATIONS] Skipping migrations");
        return Ok(());
    }

    info!(
        "[MIGRATIONS] Starting migration process for environment: {}",
        config.server.environment
    );

    match diesel::run_migrations(&config.database.url).await {
        Ok(0) => info!("[MIGRATIONS] ✓ Diesel migrations up to date"),
        Ok(applied) => info!("[MIGRATIONS] ✓ Applied {} Diesel migrations", applied),
        Err(e) => {
            error!("[MIGRATIONS] ✗ Diesel migration failed: {}", e);
            return Err(format!("Diesel migration failed: {}", e).into());
        },
    }

    Ok(())
}

/// Migrations only apply to the postgres backend and can be disabled explicitly
pub fn should_run_migrations(config: &AppConfig) -> bool {
    config.store.backend == StoreBackend::Postgres && !config.store.disable_embedded_migrations
}
