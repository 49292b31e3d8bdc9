// Application state shared across handlers
use std::sync::Arc;

use crate::{
    app_config::AppConfig,
    db::DocumentStore,
    services::{JwtService, MediaHost},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub jwt_service: Arc<JwtService>,
    pub media: Arc<dyn MediaHost>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn DocumentStore>,
        jwt_service: Arc<JwtService>,
        media: Arc<dyn MediaHost>,
    ) -> Self {
        Self {
            config,
            store,
            jwt_service,
            media,
        }
    }
}
