// OpenAPI schema definitions generated by utoipa

use serde_json::{json, Map, Value};
use utoipa::OpenApi;

use crate::models::{
    Animal, CreateReviewRequest, CreateUserRequest, ErrorResponse, Habitat, Image, LoginRequest,
    LoginResponse, MessageResponse, MutationResponse, Race, Report, Review, Service,
    UpdateUserRequest, UserResponse,
};

/// utoipa document for the concrete (non-generic) handlers and all schemas
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::users::create_user,
        crate::handlers::users::list_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::login,
        crate::handlers::reviews::list_reviews,
        crate::handlers::reviews::get_review,
        crate::handlers::reviews::create_review,
        crate::handlers::reviews::toggle_review_visibility,
        crate::handlers::reviews::delete_review,
        crate::handlers::images::list_images,
        crate::handlers::images::get_image,
        crate::handlers::images::upload_image,
        crate::handlers::images::delete_image,
    ),
    components(
        schemas(
            Animal,
            Habitat,
            Race,
            Service,
            Report,
            Review,
            Image,
            UserResponse,
            CreateUserRequest,
            UpdateUserRequest,
            CreateReviewRequest,
            LoginRequest,
            LoginResponse,
            MessageResponse,
            MutationResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Users", description = "Staff accounts and login"),
        (name = "Reviews", description = "Visitor reviews and moderation"),
        (name = "Images", description = "Image upload to the media host")
    )
)]
pub struct ArcadiaApiDoc;

fn generated() -> Value {
    serde_json::to_value(ArcadiaApiDoc::openapi()).unwrap_or_default()
}

/// Every schema known to the API, keyed by name
pub fn all_schemas() -> Value {
    let mut schemas = generated()
        .pointer("/components/schemas")
        .cloned()
        .unwrap_or_else(|| json!({}));

    if let Value::Object(ref mut map) = schemas {
        map.insert("HealthResponse".to_string(), health_response_schema());
    }

    schemas
}

/// Paths documented through `#[utoipa::path]`
pub fn generated_paths() -> Map<String, Value> {
    match generated().get("paths") {
        Some(Value::Object(paths)) => paths.clone(),
        _ => Map::new(),
    }
}

fn health_response_schema() -> Value {
    json!({
        "type": "object",
        "required": ["status", "service", "store"],
        "properties": {
            "status": {"type": "string", "enum": ["healthy", "degraded"]},
            "service": {"type": "string"},
            "timestamp": {"type": "string", "format": "date-time"},
            "store": {
                "type": "object",
                "properties": {
                    "backend": {"type": "string", "enum": ["postgres", "memory"]},
                    "status": {"type": "string", "enum": ["healthy", "unhealthy"]},
                    "error": {"type": "string", "nullable": true}
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemas_include_models() {
        let schemas = all_schemas();
        for name in ["Animal", "Review", "Image", "UserResponse", "HealthResponse"] {
            assert!(schemas.get(name).is_some(), "missing schema {}", name);
        }
        assert!(schemas["UserResponse"]["properties"]
            .get("hashed_password")
            .is_none());
    }

    #[test]
    fn test_generated_paths() {
        let paths = generated_paths();
        assert!(paths.contains_key("/user/login"));
        assert!(paths.contains_key("/avis/{id}"));
        assert!(paths.contains_key("/image"));

        assert!(paths["/user/{id}"]["put"]["requestBody"].is_object());
        assert!(paths["/avis"]["post"]["requestBody"].is_object());
    }
}
