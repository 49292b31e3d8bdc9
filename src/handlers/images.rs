// Image handlers: multipart upload to the media host, listing and deletion
//
// Uploads are staged in UPLOAD_DIR and the staged file is removed whether
// the media host accepts it or not.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::path::{Path as FsPath, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    app::AppState,
    db::{Document, Fields},
    middleware::{authorize, Identity},
    models::{ErrorResponse, Image, MessageResponse},
    services::media::public_id_from_url,
    utils::{
        ids::{generate_id, LABEL_LENGTH},
        ApiError, ApiResult,
    },
};

pub const IMAGES_COLLECTION: &str = "images";
pub const IMAGE_FIELD: &str = "image";

fn image_not_found() -> ApiError {
    ApiError::NotFound("Image non trouvée.".to_string())
}

/// File read from the `image` multipart field
struct IncomingFile {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

async fn read_image_field(multipart: &mut Multipart) -> ApiResult<Option<IncomingFile>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        return Ok(Some(IncomingFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}

/// Keep a file name safe for use inside the staging directory
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

async fn stage_file(upload_dir: &str, file_name: &str, bytes: &[u8]) -> ApiResult<PathBuf> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| ApiError::Internal(format!("cannot create upload dir: {}", e)))?;

    let path = FsPath::new(upload_dir).join(format!(
        "{}-{}",
        Uuid::new_v4().simple(),
        sanitize_file_name(file_name)
    ));

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("cannot stage upload: {}", e)))?;

    Ok(path)
}

async fn remove_staged_file(path: &FsPath) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Could not remove staged upload {}: {}", path.display(), e);
    }
}

#[utoipa::path(
    get,
    path = "/image",
    tag = "Images",
    operation_id = "listImages",
    responses((status = 200, description = "All images", body = [Image]))
)]
pub async fn list_images(State(state): State<AppState>) -> ApiResult<Json<Vec<Value>>> {
    let documents = state.store.list(IMAGES_COLLECTION).await?;
    Ok(Json(documents.iter().map(Document::to_json).collect()))
}

#[utoipa::path(
    get,
    path = "/image/{id}",
    tag = "Images",
    operation_id = "getImage",
    params(("id" = String, Path, description = "Image id")),
    responses(
        (status = 200, description = "Image", body = Image),
        (status = 404, description = "Unknown image", body = ErrorResponse)
    )
)]
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let document = state
        .store
        .get(IMAGES_COLLECTION, &id)
        .await?
        .ok_or_else(image_not_found)?;
    Ok(Json(document.to_json()))
}

/// Upload an image (multipart field `image`) to the media host
#[utoipa::path(
    post,
    path = "/image",
    tag = "Images",
    operation_id = "uploadImage",
    request_body(content = String, content_type = "multipart/form-data", description = "Multipart form with an `image` file field"),
    responses(
        (status = 201, description = "Image stored"),
        (status = 400, description = "No file or not an image", body = ErrorResponse),
        (status = 403, description = "Missing/invalid token or non-admin caller", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn upload_image(
    State(state): State<AppState>,
    identity: Result<Identity, ApiError>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let no_file = || ApiError::BadRequest("Aucun fichier téléchargé.".to_string());

    let mut multipart = multipart.map_err(|_| no_file())?;
    let file = read_image_field(&mut multipart).await?.ok_or_else(no_file)?;

    let content_type = match &file.content_type {
        Some(ct) if ct.starts_with("image/") => ct.clone(),
        _ => {
            return Err(ApiError::BadRequest(
                "Le fichier doit être une image.".to_string(),
            ))
        },
    };

    let label = file
        .file_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| generate_id(LABEL_LENGTH));

    let staged = stage_file(&state.config.media.upload_dir, &label, &file.bytes).await?;
    let result = store_upload(&state, identity, &staged, &label, &content_type).await;
    remove_staged_file(&staged).await;

    let (image, token) = result?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Image téléchargée et stockée avec succès",
            "data": image,
            "token": token,
        })),
    )
        .into_response())
}

async fn store_upload(
    state: &AppState,
    identity: Result<Identity, ApiError>,
    staged: &FsPath,
    label: &str,
    content_type: &str,
) -> ApiResult<(Image, String)> {
    let (identity, token) = authorize(identity, state)?;
    identity.require_admin()?;

    let asset = state.media.upload(staged, label, content_type).await?;

    let mut fields = Fields::new();
    fields.insert("label".to_string(), json!(label));
    fields.insert("url".to_string(), json!(asset.secure_url));
    fields.insert("public_id".to_string(), json!(asset.public_id));

    let document = state.store.insert(IMAGES_COLLECTION, fields).await?;
    info!("Image {} uploaded by {}", document.id, identity.id);

    let image = Image {
        id: document.id,
        label: label.to_string(),
        url: asset.secure_url,
        public_id: asset.public_id,
    };
    Ok((image, token))
}

/// Delete an image from the media host, then its document
#[utoipa::path(
    delete,
    path = "/image/{id}",
    tag = "Images",
    operation_id = "deleteImage",
    params(("id" = String, Path, description = "Image id")),
    responses(
        (status = 200, description = "Image deleted", body = MessageResponse),
        (status = 400, description = "Asset id cannot be derived", body = ErrorResponse),
        (status = 403, description = "Missing/invalid token or non-admin caller", body = ErrorResponse),
        (status = 404, description = "Unknown image", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    identity: Result<Identity, ApiError>,
) -> ApiResult<Json<Value>> {
    let document = state
        .store
        .get(IMAGES_COLLECTION, &id)
        .await?
        .ok_or_else(image_not_found)?;

    let (identity, token) = authorize(identity, &state)?;
    identity.require_admin()?;

    let public_id = document
        .get_str("public_id")
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .or_else(|| document.get_str("url").and_then(public_id_from_url))
        .ok_or_else(|| ApiError::BadRequest("Public ID introuvable.".to_string()))?;

    state.media.destroy(&public_id).await?;
    state.store.delete(IMAGES_COLLECTION, &id).await?;
    info!("Image {} ({}) deleted by {}", id, public_id, identity.id);

    Ok(Json(json!({
        "message": "Image supprimée avec succès.",
        "token": token,
    })))
}
