// Generic CRUD controller for the zoo collections
// One router per resource kind; the kind is injected as a request extension

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    app::AppState,
    db::{Document, Fields},
    middleware::{authorize, Identity},
    utils::{
        check_required_fields, id_list_body,
        image_ids::{add_ids, current_ids, images_patch, parse_ids, remove_ids, IMAGES_FIELD},
        object_body, ApiError, ApiResult,
    },
};

pub const NO_DATA: &str = "Pas de données";
pub const VIEWS_FIELD: &str = "nb_vues";

/// Static description of one resource collection and its HTTP behaviour
#[derive(Debug)]
pub struct ResourceKind {
    /// Store collection name
    pub collection: &'static str,
    /// URL prefix the router is nested under
    pub prefix: &'static str,
    /// Human label used in messages ("Animal", "Habitat", ...)
    pub label: &'static str,
    /// OpenAPI schema name
    pub schema: &'static str,
    pub required_fields: &'static [&'static str],
    /// Status answered when the collection is empty
    pub empty_list_status: StatusCode,
    /// Detail reads increment `nb_vues`
    pub counts_views: bool,
}

pub static ANIMAL: ResourceKind = ResourceKind {
    collection: "animals",
    prefix: "/animal",
    label: "Animal",
    schema: "Animal",
    required_fields: &["prenom", "race_id", "habitat_id"],
    empty_list_status: StatusCode::NOT_FOUND,
    counts_views: true,
};

pub static HABITAT: ResourceKind = ResourceKind {
    collection: "habitats",
    prefix: "/habitat",
    label: "Habitat",
    schema: "Habitat",
    required_fields: &["nom", "description", "commentaire"],
    empty_list_status: StatusCode::NON_AUTHORITATIVE_INFORMATION,
    counts_views: false,
};

pub static RACE: ResourceKind = ResourceKind {
    collection: "races",
    prefix: "/race",
    label: "Race",
    schema: "Race",
    required_fields: &[
        "nom_commun",
        "nom_scientifique",
        "type_habitat",
        "famille",
        "origine",
    ],
    empty_list_status: StatusCode::NOT_FOUND,
    counts_views: false,
};

pub static SERVICE: ResourceKind = ResourceKind {
    collection: "services",
    prefix: "/service",
    label: "Service",
    schema: "Service",
    required_fields: &["nom", "description"],
    empty_list_status: StatusCode::NOT_FOUND,
    counts_views: false,
};

pub static REPORT: ResourceKind = ResourceKind {
    collection: "rapports",
    prefix: "/rapport",
    label: "Rapport",
    schema: "Report",
    required_fields: &["nom", "description"],
    empty_list_status: StatusCode::NOT_FOUND,
    counts_views: false,
};

pub static RESOURCES: [&ResourceKind; 5] = [&ANIMAL, &HABITAT, &RACE, &SERVICE, &REPORT];

impl ResourceKind {
    fn not_found(&self) -> ApiError {
        ApiError::NotFound(format!("{} introuvable", self.label))
    }

    async fn load(&self, state: &AppState, id: &str) -> ApiResult<Document> {
        state
            .store
            .get(self.collection, id)
            .await?
            .ok_or_else(|| self.not_found())
    }
}

/// Client-supplied fields minus the identifier, with `images_id` deduplicated
fn writable(mut fields: Fields) -> ApiResult<Fields> {
    fields.remove("id");

    if let Some(value) = fields.get(IMAGES_FIELD) {
        let ids = parse_ids(value).ok_or_else(|| {
            ApiError::BadRequest(format!("{} doit être une liste d'identifiants", IMAGES_FIELD))
        })?;
        fields.extend(images_patch(ids));
    }

    Ok(fields)
}

/// GET /{prefix}
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static ResourceKind>,
) -> ApiResult<Response> {
    let documents = state.store.list(kind.collection).await?;

    if documents.is_empty() {
        return Ok((kind.empty_list_status, Json(json!({ "message": NO_DATA }))).into_response());
    }

    let body: Vec<Value> = documents.iter().map(Document::to_json).collect();
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// GET /{prefix}/{id}
pub async fn get_document(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static ResourceKind>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let document = kind.load(&state, &id).await?;

    if !kind.counts_views {
        return Ok(Json(document.to_json()));
    }

    let views = document.get_i64(VIEWS_FIELD).unwrap_or(0) + 1;
    let mut patch = Fields::new();
    patch.insert(VIEWS_FIELD.to_string(), json!(views));

    let updated = state
        .store
        .update(kind.collection, &id, patch)
        .await?
        .ok_or_else(|| kind.not_found())?;

    Ok(Json(updated.to_json()))
}

/// POST /{prefix}
pub async fn create_document(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static ResourceKind>,
    identity: Result<Identity, ApiError>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let mut fields = writable(object_body(body)?)?;
    check_required_fields(&fields, kind.required_fields)?;

    let (identity, token) = authorize(identity, &state)?;
    identity.require_admin()?;

    if kind.counts_views {
        fields.insert(VIEWS_FIELD.to_string(), json!(0));
    }

    let document = state.store.insert(kind.collection, fields).await?;
    info!("{} {} created by {}", kind.label, document.id, identity.id);

    Ok(Json(json!({
        "message": format!("document ajouté avec id : {}", document.id),
        "id": document.id,
        "data": document.to_json(),
        "token": token,
    })))
}

/// PUT /{prefix}/{id}
pub async fn update_document(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static ResourceKind>,
    Path(id): Path<String>,
    identity: Result<Identity, ApiError>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let fields = writable(object_body(body)?)?;
    check_required_fields(&fields, kind.required_fields)?;
    kind.load(&state, &id).await?;

    let (identity, token) = authorize(identity, &state)?;
    identity.require_admin()?;

    let document = state
        .store
        .update(kind.collection, &id, fields)
        .await?
        .ok_or_else(|| kind.not_found())?;
    info!("{} {} updated by {}", kind.label, id, identity.id);

    Ok(Json(json!({
        "message": format!("document mis à jour avec id : {}", id),
        "data": document.to_json(),
        "token": token,
    })))
}

/// DELETE /{prefix}/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static ResourceKind>,
    Path(id): Path<String>,
    identity: Result<Identity, ApiError>,
) -> ApiResult<Response> {
    kind.load(&state, &id).await?;

    let (identity, token) = authorize(identity, &state)?;
    identity.require_admin()?;

    if !state.store.delete(kind.collection, &id).await? {
        return Err(kind.not_found());
    }
    info!("{} {} deleted by {}", kind.label, id, identity.id);

    Ok((
        StatusCode::NON_AUTHORITATIVE_INFORMATION,
        Json(json!({
            "message": format!("{} supprimé avec succès {}", kind.label, id),
            "token": token,
        })),
    )
        .into_response())
}

#[derive(Clone, Copy)]
enum ImageListChange {
    Add,
    Remove,
}

async fn change_images(
    state: AppState,
    kind: &'static ResourceKind,
    id: String,
    identity: Result<Identity, ApiError>,
    body: Result<Json<Value>, JsonRejection>,
    change: ImageListChange,
) -> ApiResult<Json<Value>> {
    let requested = id_list_body(body)?;
    let document = kind.load(&state, &id).await?;

    let (identity, token) = authorize(identity, &state)?;
    identity.require_admin()?;

    let current = current_ids(&document.fields);
    let ids = match change {
        ImageListChange::Add => add_ids(current, &requested),
        ImageListChange::Remove => remove_ids(current, &requested),
    };

    // Nothing to record on a document that never had images
    let document = if ids.is_empty() && !document.fields.contains_key(IMAGES_FIELD) {
        document
    } else {
        state
            .store
            .update(kind.collection, &id, images_patch(ids))
            .await?
            .ok_or_else(|| kind.not_found())?
    };

    Ok(Json(json!({
        "message": format!("Document mis à jour avec id : {}", id),
        "data": document.to_json(),
        "token": token,
    })))
}

/// PUT /{prefix}/images/{id}
pub async fn add_images(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static ResourceKind>,
    Path(id): Path<String>,
    identity: Result<Identity, ApiError>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    change_images(state, kind, id, identity, body, ImageListChange::Add).await
}

/// PUT /{prefix}/images/{id}/remove
pub async fn remove_images(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static ResourceKind>,
    Path(id): Path<String>,
    identity: Result<Identity, ApiError>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    change_images(state, kind, id, identity, body, ImageListChange::Remove).await
}
