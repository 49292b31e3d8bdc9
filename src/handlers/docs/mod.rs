// API documentation handlers
pub mod health;
pub mod resources;
pub mod schemas;
pub mod swagger_ui;

use crate::app::AppState;
use crate::app_config::AppConfig;
use crate::handlers::resource::RESOURCES;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{self, json, Map, Value};

/// Serve OpenAPI JSON at /api-docs/openapi.json
pub async fn serve_openapi_spec(State(app_state): State<AppState>) -> Response {
    let spec = build_openapi_spec(app_state.config.as_ref());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        serde_json::to_string(&spec).unwrap_or_default(),
    )
        .into_response()
}

pub use swagger_ui::serve_swagger_ui;

fn all_paths() -> Map<String, Value> {
    let mut paths = Map::new();
    paths.insert("/".to_string(), health::root_endpoint());
    paths.insert("/health".to_string(), health::health_endpoint());

    for kind in RESOURCES.iter() {
        paths.extend(resources::resource_paths(kind));
    }

    // `/user` and `/user/{id}` come from several handlers; merge per verb
    for (path, item) in schemas::generated_paths() {
        let entry = paths.entry(path).or_insert_with(|| json!({}));
        if let (Value::Object(existing), Value::Object(verbs)) = (entry, item) {
            existing.extend(verbs);
        }
    }

    paths
}

/// Build the complete OpenAPI document
pub fn build_openapi_spec(config: &AppConfig) -> Value {
    let mut tags = vec![json!({"name": "Health", "description": "Service health checks"})];
    tags.extend(RESOURCES.iter().map(|kind| {
        json!({
            "name": kind.schema,
            "description": format!("`{}` collection", kind.collection)
        })
    }));
    tags.extend([
        json!({"name": "Users", "description": "Staff accounts and login"}),
        json!({"name": "Reviews", "description": "Visitor reviews and moderation"}),
        json!({"name": "Images", "description": "Image upload to the media host"}),
    ]);

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Arcadia API",
            "description": "Zoo Arcadia back office: animals, habitats, races, services, veterinary reports, reviews, images and staff accounts",
            "version": env!("CARGO_PKG_VERSION")
        },
        "servers": [{
            "url": config.server.server_address,
            "description": format!("Current server ({})", config.server.environment)
        }],
        "tags": tags,
        "paths": all_paths(),
        "components": {
            "schemas": schemas::all_schemas(),
            "securitySchemes": {
                "bearerAuth": {
                    "type": "http",
                    "scheme": "bearer",
                    "bearerFormat": "JWT",
                    "description": "Token returned by /user/login or by any authorized mutation"
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_every_prefix() {
        let spec = build_openapi_spec(&AppConfig::for_test());
        let paths = spec["paths"].as_object().unwrap();

        for path in [
            "/", "/health", "/animal", "/habitat/{id}", "/race/images/{id}",
            "/service/images/{id}/remove", "/rapport", "/avis", "/image/{id}", "/user",
            "/user/{id}", "/user/login",
        ] {
            assert!(paths.contains_key(path), "missing path {}", path);
        }

        assert!(paths["/user"].get("get").is_some());
        assert!(paths["/user"].get("post").is_some());
        assert_eq!(spec["servers"][0]["url"], "http://localhost:8080");
    }
}
