// Embedded Diesel migrations for the `documents` table
// MigrationHarness only works on a sync PgConnection, so the run happens on the blocking pool

use crate::db::diesel_pool::MIGRATIONS;
use diesel::{Connection, PgConnection};
use diesel_migrations::MigrationHarness;
use std::error::Error;
use tracing::{debug, info};

type MigrationResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

fn apply_pending(database_url: &str) -> MigrationResult<Vec<String>> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|e| format!("Failed to connect for migrations: {}", e))?;

    let pending = conn
        .pending_migrations(MIGRATIONS)
        .map_err(|e| format!("Failed to list pending migrations: {}", e))?;

    if pending.is_empty() {
        return Ok(Vec::new());
    }
    debug!("[DIESEL] {} pending migrations", pending.len());

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| format!("Failed to apply migrations: {}", e))?;

    Ok(applied.iter().map(ToString::to_string).collect())
}

/// Apply pending migrations and return how many ran
pub async fn run_migrations(database_url: &str) -> MigrationResult<usize> {
    let database_url = database_url.to_string();

    let applied = tokio::task::spawn_blocking(move || apply_pending(&database_url))
        .await
        .map_err(|e| format!("Migration task failed: {}", e))??;

    for name in &applied {
        info!("[DIESEL] Applied {}", name);
    }

    Ok(applied.len())
}
