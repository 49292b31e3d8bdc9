// Request-level error type shared by every handler
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{
    db::StoreError,
    services::{jwt::JwtError, media::MediaError},
    utils::password::PasswordError,
};

pub const NO_TOKEN: &str = "NO TOKEN";
pub const INVALID_TOKEN: &str = "INVALID TOKEN";
pub const FORBIDDEN_FOR_ROLE: &str = "INTERDIT POUR VOTRE RÔLE";
pub const DUPLICATE_USERNAME: &str = "Un utilisateur avec ce pseudo existe déjà";

#[derive(Error, Debug)]
pub enum ApiError {
    /// A required field is absent from the body; carries the field name
    #[error("{0} est manquant")]
    MissingField(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("NO TOKEN")]
    NoToken,

    #[error("INVALID TOKEN")]
    InvalidToken,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Media host error: {0}")]
    Media(#[from] MediaError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Jwt(#[from] JwtError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn forbidden_for_role() -> Self {
        ApiError::Forbidden(FORBIDDEN_FOR_ROLE.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingField(_)
            | ApiError::Forbidden(_)
            | ApiError::NoToken
            | ApiError::InvalidToken
            | ApiError::Store(StoreError::Duplicate(_)) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_)
            | ApiError::Media(_)
            | ApiError::Password(_)
            | ApiError::Jwt(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            // The only unique constraint is the staff username index
            ApiError::Store(StoreError::Duplicate(_)) => DUPLICATE_USERNAME.to_string(),
            ApiError::Store(_) => "Erreur lors de l'accès aux données".to_string(),
            ApiError::Media(_) => "Erreur lors de l'échange avec l'hébergeur d'images".to_string(),
            ApiError::Password(_) | ApiError::Jwt(_) | ApiError::Internal(_) => {
                "Erreur interne du serveur".to_string()
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status.as_u16(), self);
        }

        let body = Json(json!({
            "error": self.client_message(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(error: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(error.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(error: ApiError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_field_is_forbidden() {
        let (status, body) = body_of(ApiError::MissingField("prenom".to_string())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "prenom est manquant");
        assert_eq!(body["status"], 403);
    }

    #[tokio::test]
    async fn test_token_errors() {
        let (status, body) = body_of(ApiError::NoToken).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], NO_TOKEN);

        let (_, body) = body_of(ApiError::InvalidToken).await;
        assert_eq!(body["error"], INVALID_TOKEN);
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) =
            body_of(ApiError::Store(StoreError::Database("relation missing".into()))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("relation"));
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let (status, body) = body_of(ApiError::Store(StoreError::Duplicate(
            "documents_users_username_key".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], DUPLICATE_USERNAME);
    }
}
