// Library exports for the Arcadia API
// The binary and the integration tests build the router through `build_router`

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, StoreBackend, CONFIG};
pub use db::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
pub use middleware::Identity;
pub use services::{CloudinaryClient, JwtConfig, JwtService, MediaHost};
pub use utils::{ApiError, ApiResult};

use handlers::resource::{ANIMAL, HABITAT, RACE, REPORT, SERVICE};

/// Build the shared state for a configuration: store backend, token service, media host
pub async fn initialize_app_state(
    config: AppConfig,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Postgres => {
            info!(
                "Initializing database pool for {}",
                db::mask_connection_string(&config.database.url)
            );
            let pool = db::create_diesel_pool(&db::PoolSettings::from(&config.database)).await?;
            Arc::new(PgDocumentStore::new(pool))
        },
        StoreBackend::Memory => {
            info!("Using in-memory document store");
            Arc::new(MemoryDocumentStore::new())
        },
    };

    if !config.media.is_configured() {
        tracing::warn!("Cloudinary credentials missing: image upload and deletion will fail");
    }

    let jwt_service = Arc::new(JwtService::new(JwtConfig::from_app_config(&config.jwt)));
    let media: Arc<dyn MediaHost> = Arc::new(CloudinaryClient::new(&config.media));

    Ok(AppState::new(Arc::new(config), store, jwt_service, media))
}

/// Full application router with CORS and request tracing
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/user", handlers::user_routes())
        .nest("/animal", handlers::resource_routes(&ANIMAL))
        .nest("/habitat", handlers::resource_routes(&HABITAT))
        .nest("/race", handlers::resource_routes(&RACE))
        .nest("/service", handlers::resource_routes(&SERVICE))
        .nest("/rapport", handlers::resource_routes(&REPORT))
        .nest("/avis", handlers::review_routes())
        .nest("/image", handlers::image_routes(config.media.max_upload_bytes))
        .nest(
            "/api-docs",
            handlers::docs_routes(config.features.enable_swagger_ui),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::dynamic_cors_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> &'static str {
    "Hello World !"
}

// Health check handler
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();
    let backend = state.store.backend_name();

    let (healthy, store) = match state.store.ping().await {
        Ok(()) => (
            true,
            serde_json::json!({ "backend": backend, "status": "healthy", "error": null }),
        ),
        Err(e) => (
            false,
            serde_json::json!({
                "backend": backend,
                "status": "unhealthy",
                "error": format!("Store check failed: {}", e)
            }),
        ),
    };

    let response = serde_json::json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "service": "arcadia-api",
        "timestamp": timestamp,
        "store": store
    });

    if healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
