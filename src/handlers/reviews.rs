// Visitor reviews (`avis`): public submission, admin moderation

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    app::AppState,
    db::Document,
    handlers::resource::NO_DATA,
    middleware::{authorize, Identity},
    models::{CreateReviewRequest, ErrorResponse, MessageResponse, MutationResponse, Review},
    utils::{check_required_fields, object_body, ApiError, ApiResult},
};

pub const REVIEWS_COLLECTION: &str = "avis";
pub const VISIBLE_FIELD: &str = "is_visible";
const REVIEW_REQUIRED_FIELDS: &[&str] = &["pseudo", "commentaire"];

fn review_not_found() -> ApiError {
    ApiError::NotFound("Avis introuvable".to_string())
}

async fn load_review(state: &AppState, id: &str) -> ApiResult<Document> {
    state
        .store
        .get(REVIEWS_COLLECTION, id)
        .await?
        .ok_or_else(review_not_found)
}

#[utoipa::path(
    get,
    path = "/avis",
    tag = "Reviews",
    operation_id = "listReviews",
    responses(
        (status = 200, description = "All reviews", body = [Review]),
        (status = 404, description = "No reviews", body = MessageResponse)
    )
)]
pub async fn list_reviews(State(state): State<AppState>) -> ApiResult<Response> {
    let documents = state.store.list(REVIEWS_COLLECTION).await?;

    if documents.is_empty() {
        return Ok((StatusCode::NOT_FOUND, Json(json!({ "message": NO_DATA }))).into_response());
    }

    let reviews: Vec<Value> = documents.iter().map(Document::to_json).collect();
    Ok((StatusCode::OK, Json(reviews)).into_response())
}

#[utoipa::path(
    get,
    path = "/avis/{id}",
    tag = "Reviews",
    operation_id = "getReview",
    params(("id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review", body = Review),
        (status = 404, description = "Unknown review", body = ErrorResponse)
    )
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    Ok(Json(load_review(&state, &id).await?.to_json()))
}

/// Submit a review; it stays hidden until moderated
#[utoipa::path(
    post,
    path = "/avis",
    tag = "Reviews",
    operation_id = "createReview",
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Review stored (hidden)", body = MutationResponse),
        (status = 403, description = "Missing field", body = ErrorResponse)
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let mut fields = object_body(body)?;
    check_required_fields(&fields, REVIEW_REQUIRED_FIELDS)?;

    fields.remove("id");
    fields.insert(VISIBLE_FIELD.to_string(), Value::Bool(false));

    let document = state.store.insert(REVIEWS_COLLECTION, fields).await?;
    info!("Review {} submitted", document.id);

    Ok(Json(json!({
        "message": format!("document ajouté avec id : {}", document.id),
        "id": document.id,
        "data": document.to_json(),
    })))
}

/// Flip a review between shown and hidden
#[utoipa::path(
    put,
    path = "/avis/{id}",
    tag = "Reviews",
    operation_id = "toggleReviewVisibility",
    params(("id" = String, Path, description = "Review id")),
    responses(
        (status = 203, description = "Visibility toggled", body = MutationResponse),
        (status = 403, description = "Missing/invalid token or non-admin caller", body = ErrorResponse),
        (status = 404, description = "Unknown review", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn toggle_review_visibility(
    State(state): State<AppState>,
    Path(id): Path<String>,
    identity: Result<Identity, ApiError>,
) -> ApiResult<Response> {
    let review = load_review(&state, &id).await?;

    let (identity, token) = authorize(identity, &state)?;
    identity.require_admin()?;

    let visible = !review.get_bool(VISIBLE_FIELD).unwrap_or(false);
    let mut patch = crate::db::Fields::new();
    patch.insert(VISIBLE_FIELD.to_string(), Value::Bool(visible));

    let document = state
        .store
        .update(REVIEWS_COLLECTION, &id, patch)
        .await?
        .ok_or_else(review_not_found)?;

    let state_label = if visible { "affiché" } else { "caché" };
    info!("Review {} {} by {}", id, state_label, identity.id);

    Ok((
        StatusCode::NON_AUTHORITATIVE_INFORMATION,
        Json(json!({
            "message": format!("avis {} avec succès, {}", state_label, id),
            "data": document.to_json(),
            "token": token,
        })),
    )
        .into_response())
}

#[utoipa::path(
    delete,
    path = "/avis/{id}",
    tag = "Reviews",
    operation_id = "deleteReview",
    params(("id" = String, Path, description = "Review id")),
    responses(
        (status = 203, description = "Review deleted", body = MessageResponse),
        (status = 403, description = "Missing/invalid token or non-admin caller", body = ErrorResponse),
        (status = 404, description = "Unknown review", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    identity: Result<Identity, ApiError>,
) -> ApiResult<Response> {
    load_review(&state, &id).await?;

    let (identity, token) = authorize(identity, &state)?;
    identity.require_admin()?;

    state.store.delete(REVIEWS_COLLECTION, &id).await?;
    info!("Review {} deleted by {}", id, identity.id);

    Ok((
        StatusCode::NON_AUTHORITATIVE_INFORMATION,
        Json(json!({
            "message": format!("avis supprimé avec succès {}", id),
            "token": token,
        })),
    )
        .into_response())
}
