// HTTP handlers and route builders, one router per URL prefix

pub mod docs;
pub mod images;
pub mod resource;
pub mod reviews;
pub mod users;

use crate::app::AppState;
use axum::{
    extract::{DefaultBodyLimit, Extension},
    routing::{get, post, put},
    Router,
};
use resource::ResourceKind;

/// CRUD and image-list routes for one zoo collection
pub fn resource_routes(kind: &'static ResourceKind) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(resource::list_documents).post(resource::create_document),
        )
        .route(
            "/{id}",
            get(resource::get_document)
                .put(resource::update_document)
                .delete(resource::delete_document),
        )
        .route("/images/{id}", put(resource::add_images))
        .route("/images/{id}/remove", put(resource::remove_images))
        .layer(Extension(kind))
}

// Staff account routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/login", post(users::login))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}

// Review routes
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(reviews::list_reviews).post(reviews::create_review))
        .route(
            "/{id}",
            get(reviews::get_review)
                .put(reviews::toggle_review_visibility)
                .delete(reviews::delete_review),
        )
}

// Image routes; uploads are capped at `max_upload_bytes`
pub fn image_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(images::list_images)
                .post(images::upload_image)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/{id}",
            get(images::get_image).delete(images::delete_image),
        )
}

// Documentation routes; the Swagger UI page is optional
pub fn docs_routes(enable_swagger_ui: bool) -> Router<AppState> {
    let router = Router::new().route("/openapi.json", get(docs::serve_openapi_spec));

    if enable_swagger_ui {
        router.route("/", get(docs::serve_swagger_ui))
    } else {
        router
    }
}
