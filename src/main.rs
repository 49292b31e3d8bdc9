use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arcadia_api::{
    app_config::AppConfig, build_router, initialize_app_state, migrations, services,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.rust_log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Arcadia API on {} ({})",
        config.server.bind_address, config.server.environment
    );

    if let Err(e) = migrations::run_all_migrations(&config).await {
        error!("Migration failed: {}", e);
        anyhow::bail!("Migration failed: {}", e);
    }

    let bind_address = config.server.bind_address.clone();
    let state = initialize_app_state(config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize application state: {}", e))?;

    match services::ensure_admin(state.store.as_ref(), &state.config.bootstrap).await {
        Ok(outcome) => info!("Admin bootstrap: {:?}", outcome),
        Err(e) => error!("Admin bootstrap failed: {}", e),
    }

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("API lancée sur {}", bind_address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
