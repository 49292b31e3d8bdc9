// Bearer-token identity extraction
//
// Handlers take `Result<Identity, ApiError>` rather than `Identity` so body
// and existence checks can answer before the token is looked at.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{app::AppState, models::auth::Role, utils::ApiError};

/// Caller identity decoded from a valid access token
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: String,
    pub role: i64,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.id()
    }

    /// Resource mutations are reserved to admins
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden_for_role())
        }
    }

    /// Self-service on user accounts: the account owner or an admin
    pub fn require_self_or_admin(&self, user_id: &str) -> Result<(), ApiError> {
        if self.is_admin() || self.id == user_id {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Il est interdit de changer les données d'un autre utilisateur".to_string(),
            ))
        }
    }
}

/// Resolve the identity and a renewed token, or the rejection to answer with
pub fn authorize(
    identity: Result<Identity, ApiError>,
    state: &AppState,
) -> Result<(Identity, String), ApiError> {
    let identity = identity?;
    let token = state.jwt_service.generate_token(&identity.id, identity.role)?;
    Ok((identity, token))
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::NoToken)?;

        match state.jwt_service.validate_token(bearer.token()) {
            Ok(claims) => Ok(Identity {
                id: claims.id,
                role: claims.role,
            }),
            Err(e) => {
                tracing::warn!("JWT validation failed: {}", e);
                Err(ApiError::InvalidToken)
            },
        }
    }
}
