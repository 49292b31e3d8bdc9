// bb8 pool of async diesel connections backing the postgres document store

use bb8::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations};
use std::time::Duration;
use tracing::info;

use super::document_store::StoreError;
use crate::app_config::DatabaseConfig;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/diesel");

pub type DieselPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Pool sizing and timeouts, derived from the DATABASE_* variables
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub max_size: u32,
    pub min_idle: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl From<&DatabaseConfig> for PoolSettings {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_size: config.max_connections,
            min_idle: config.min_connections.min(config.max_connections),
            connect_timeout: Duration::from_secs(config.connect_timeout),
            idle_timeout: Duration::from_secs(config.idle_timeout),
            max_lifetime: Duration::from_secs(config.max_lifetime),
        }
    }
}

/// Build the pool and hand out one connection so a bad URL fails at startup
pub async fn create_diesel_pool(settings: &PoolSettings) -> Result<DieselPool, StoreError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(settings.url.as_str());

    let pool = Pool::builder()
        .max_size(settings.max_size)
        .min_idle(Some(settings.min_idle))
        .connection_timeout(settings.connect_timeout)
        .idle_timeout(Some(settings.idle_timeout))
        .max_lifetime(Some(settings.max_lifetime))
        .test_on_check_out(true)
        .build(manager)
        .await
        .map_err(|e| StoreError::Pool(e.to_string()))?;

    ping_pool(&pool).await?;

    info!(
        "Postgres pool ready: {} connections max ({})",
        settings.max_size,
        mask_connection_string(&settings.url)
    );
    Ok(pool)
}

/// Succeeds when a connection can be checked out
pub async fn ping_pool(pool: &DieselPool) -> Result<(), StoreError> {
    pool.get()
        .await
        .map(drop)
        .map_err(|e| StoreError::Pool(e.to_string()))
}

/// Database URL with credentials replaced, for logs
pub fn mask_connection_string(url: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(url) else {
        return "<invalid database url>".to_string();
    };

    if !parsed.username().is_empty() || parsed.password().is_some() {
        // Only fails for cannot-be-a-base URLs, which carry no credentials
        let _ = parsed.set_username("***");
        let _ = parsed.set_password(Some("***"));
    }

    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_connection_string_hides_credentials() {
        let masked = mask_connection_string("postgres://arcadia:secret@db:5432/arcadia");
        assert!(!masked.contains("secret"));
        assert!(!masked.contains("arcadia:"));
        assert!(masked.ends_with("@db:5432/arcadia"));

        assert_eq!(
            mask_connection_string("postgresql://localhost/arcadia"),
            "postgresql://localhost/arcadia"
        );
        assert_eq!(mask_connection_string("not a url"), "<invalid database url>");
    }

    #[test]
    fn test_pool_settings_from_app_config() {
        let mut database = crate::app_config::AppConfig::for_test().database;
        database.max_connections = 4;
        database.min_connections = 10;

        let settings = PoolSettings::from(&database);
        assert_eq!(settings.max_size, 4);
        assert_eq!(settings.min_idle, 4);
        assert_eq!(
            settings.connect_timeout,
            Duration::from_secs(database.connect_timeout)
        );
    }
}
