// Startup provisioning of the first admin account
// User creation is admin-only, so a fresh deployment needs one seeded admin

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    app_config::BootstrapConfig,
    db::{DocumentStore, Fields},
    models::{
        auth::Role,
        user::{HASH_FIELD, ROLE_FIELD, USERNAME_FIELD, USERS_COLLECTION},
    },
    utils::{password::hash_password_blocking, ApiError},
};

/// Outcome of the bootstrap step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    NotConfigured,
    AlreadyPresent,
    Created(String),
}

/// Create the configured admin if no user holds that username yet
pub async fn ensure_admin(
    store: &dyn DocumentStore,
    config: &BootstrapConfig,
) -> Result<BootstrapOutcome, ApiError> {
    let (username, password) = match (&config.admin_username, &config.admin_password) {
        (Some(username), Some(password)) => (username, password),
        (Some(_), None) | (None, Some(_)) => {
            warn!("[BOOTSTRAP] ADMIN_USERNAME and ADMIN_PASSWORD must be set together");
            return Ok(BootstrapOutcome::NotConfigured);
        },
        (None, None) => return Ok(BootstrapOutcome::NotConfigured),
    };

    let existing = store
        .find_by_field(
            USERS_COLLECTION,
            USERNAME_FIELD,
            &Value::String(username.clone()),
        )
        .await?;

    if !existing.is_empty() {
        info!("[BOOTSTRAP] Admin account '{}' already present", username);
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    let hashed = hash_password_blocking(password.clone()).await?;

    let mut fields = Fields::new();
    fields.insert(USERNAME_FIELD.to_string(), json!(username));
    fields.insert("nom".to_string(), json!("Admin"));
    fields.insert("prenom".to_string(), json!("Arcadia"));
    fields.insert(ROLE_FIELD.to_string(), json!(Role::Admin.id()));
    fields.insert(HASH_FIELD.to_string(), json!(hashed));

    let document = store.insert(USERS_COLLECTION, fields).await?;
    info!("[BOOTSTRAP] Created admin account '{}' ({})", username, document.id);

    Ok(BootstrapOutcome::Created(document.id))
}
