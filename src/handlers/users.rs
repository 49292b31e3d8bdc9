// Staff account handlers: CRUD plus login
// Password hashes never leave the store; every response goes through `public_user`

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};
use validator::Validate;

use crate::{
    app::AppState,
    db::{Document, Fields},
    handlers::resource::NO_DATA,
    middleware::{authorize, Identity},
    models::{
        auth::{LoginRequest, Role},
        user::{
            public_user, role_of, HASH_FIELD, PASSWORD_FIELD, ROLE_FIELD, USERNAME_FIELD,
            USERS_COLLECTION, USER_REQUIRED_FIELDS,
        },
        CreateUserRequest, ErrorResponse, LoginResponse, MessageResponse, MutationResponse,
        UpdateUserRequest, UserResponse,
    },
    utils::{
        api_error::DUPLICATE_USERNAME,
        check_required_fields, object_body,
        password::{hash_password_blocking, verify_password_blocking},
        ApiError, ApiResult,
    },
};

const USER_NOT_FOUND: &str = "Utilisateur non trouvé";

fn role_from_value(value: &Value) -> ApiResult<i64> {
    value
        .as_i64()
        .and_then(Role::from_id)
        .map(Role::id)
        .ok_or_else(|| ApiError::BadRequest("role_id doit valoir 0, 1 ou 2".to_string()))
}

fn string_field(fields: &Fields, name: &str) -> ApiResult<String> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest(format!("{} doit être une chaîne", name)))
}

async fn find_by_username(state: &AppState, username: &str) -> ApiResult<Option<Document>> {
    let mut matches = state
        .store
        .find_by_field(
            USERS_COLLECTION,
            USERNAME_FIELD,
            &Value::String(username.to_string()),
        )
        .await?;
    Ok(if matches.is_empty() {
        None
    } else {
        Some(matches.swap_remove(0))
    })
}

/// Create a staff account (admin only)
#[utoipa::path(
    post,
    path = "/user",
    tag = "Users",
    operation_id = "createUser",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = MutationResponse),
        (status = 400, description = "Invalid body or role_id", body = ErrorResponse),
        (status = 403, description = "Missing field, duplicate username, missing/invalid token or non-admin caller", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    identity: Result<Identity, ApiError>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let fields = object_body(body)?;
    check_required_fields(&fields, USER_REQUIRED_FIELDS)?;

    let username = string_field(&fields, USERNAME_FIELD)?;
    let password = string_field(&fields, PASSWORD_FIELD)?;
    let role_id = role_from_value(fields.get(ROLE_FIELD).unwrap_or(&Value::Null))?;

    let (identity, token) = authorize(identity, &state)?;
    identity.require_admin()?;

    if find_by_username(&state, &username).await?.is_some() {
        return Err(ApiError::Forbidden(DUPLICATE_USERNAME.to_string()));
    }

    let hashed = hash_password_blocking(password).await?;

    let mut user = Fields::new();
    user.insert(USERNAME_FIELD.to_string(), json!(username));
    for name in ["nom", "prenom"] {
        user.insert(
            name.to_string(),
            fields.get(name).cloned().unwrap_or(Value::Null),
        );
    }
    user.insert(ROLE_FIELD.to_string(), json!(role_id));
    user.insert(HASH_FIELD.to_string(), json!(hashed));

    let document = state.store.insert(USERS_COLLECTION, user).await?;
    info!("User {} ({}) created by {}", username, document.id, identity.id);

    Ok(Json(json!({
        "message": format!("document ajouté avec id : {}", document.id),
        "id": document.id,
        "data": public_user(&document),
        "token": token,
    })))
}

/// List staff accounts
#[utoipa::path(
    get,
    path = "/user",
    tag = "Users",
    operation_id = "listUsers",
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 203, description = "No users", body = MessageResponse)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Response> {
    let documents = state.store.list(USERS_COLLECTION).await?;

    if documents.is_empty() {
        return Ok((
            StatusCode::NON_AUTHORITATIVE_INFORMATION,
            Json(json!({ "message": NO_DATA })),
        )
            .into_response());
    }

    let users: Vec<Value> = documents.iter().map(public_user).collect();
    Ok((StatusCode::OK, Json(users)).into_response())
}

#[utoipa::path(
    get,
    path = "/user/{id}",
    tag = "Users",
    operation_id = "getUser",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let document = state
        .store
        .get(USERS_COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(public_user(&document)))
}

/// Update a staff account: the account owner or an admin.
///
/// The body is merged into the stored document; a `password` field is re-hashed.
#[utoipa::path(
    put,
    path = "/user/{id}",
    tag = "Users",
    operation_id = "updateUser",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = MutationResponse),
        (status = 400, description = "Invalid body or role_id", body = ErrorResponse),
        (status = 403, description = "Other user's account, username or role change", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    identity: Result<Identity, ApiError>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let mut patch = object_body(body)?;

    let (identity, token) = authorize(identity, &state)?;
    identity.require_self_or_admin(&id)?;

    let current = state
        .store
        .get(USERS_COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    if let Some(username) = patch.get(USERNAME_FIELD) {
        if username.as_str() != current.get_str(USERNAME_FIELD) {
            return Err(ApiError::Forbidden(
                "Il est interdit de changer son nom d'utilisateur".to_string(),
            ));
        }
    }

    if let Some(role) = patch.get(ROLE_FIELD) {
        let role = role_from_value(role)?;
        if !identity.is_admin() && Some(role) != role_of(&current) {
            return Err(ApiError::forbidden_for_role());
        }
        patch.insert(ROLE_FIELD.to_string(), json!(role));
    }

    patch.remove("id");
    patch.remove(HASH_FIELD);
    if let Some(password) = patch.remove(PASSWORD_FIELD) {
        let password = password
            .as_str()
            .ok_or_else(|| ApiError::BadRequest("password doit être une chaîne".to_string()))?
            .to_string();
        let hashed = hash_password_blocking(password).await?;
        patch.insert(HASH_FIELD.to_string(), json!(hashed));
    }

    let document = state
        .store
        .update(USERS_COLLECTION, &id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;
    info!("User {} updated by {}", id, identity.id);

    Ok(Json(json!({
        "message": "Mise à jour OK",
        "data": public_user(&document),
        "token": token,
    })))
}

/// Delete a staff account: the account owner or an admin
#[utoipa::path(
    delete,
    path = "/user/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 203, description = "Deleted, or nothing to delete", body = MessageResponse),
        (status = 403, description = "Other user's account or bad token", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    identity: Result<Identity, ApiError>,
) -> ApiResult<Response> {
    let (identity, token) = authorize(identity, &state)?;
    identity.require_self_or_admin(&id)?;

    let message = if state.store.delete(USERS_COLLECTION, &id).await? {
        info!("User {} deleted by {}", id, identity.id);
        "Effacement OK"
    } else {
        "pas d'enregistrement"
    };

    Ok((
        StatusCode::NON_AUTHORITATIVE_INFORMATION,
        Json(json!({ "message": message, "token": token })),
    )
        .into_response())
}

/// Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/user/login",
    tag = "Users",
    operation_id = "login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 403, description = "Wrong password", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    request.validate()?;

    let user = find_by_username(&state, &request.username)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    let Some(hash) = user.get_str(HASH_FIELD).map(str::to_string) else {
        warn!("User {} has no password hash", user.id);
        return Err(ApiError::Forbidden("Mauvais mot de passe".to_string()));
    };

    if !verify_password_blocking(request.password, hash).await? {
        warn!("Failed login for {}", request.username);
        return Err(ApiError::Forbidden("Mauvais mot de passe".to_string()));
    }

    let role = role_of(&user).unwrap_or(Role::Employee.id());
    let token = state.jwt_service.generate_token(&user.id, role)?;
    info!("User {} logged in", user.id);

    Ok(Json(json!({
        "user": public_user(&user),
        "token": token,
    })))
}
