// Staff user documents (`users` collection)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::db::Document;

pub const USERS_COLLECTION: &str = "users";
pub const HASH_FIELD: &str = "hashed_password";
pub const PASSWORD_FIELD: &str = "password";
pub const USERNAME_FIELD: &str = "username";
pub const ROLE_FIELD: &str = "role_id";

pub const USER_REQUIRED_FIELDS: &[&str] = &["username", "password", "nom", "prenom", "role_id"];

/// Public view of a staff account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub nom: String,
    pub prenom: String,
    /// 0 admin, 1 veterinarian, 2 employee
    pub role_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub nom: String,
    pub prenom: String,
    pub role_id: i64,
}

/// Partial update of a staff account; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    /// Re-hashed before storage
    pub password: Option<String>,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    /// Admin callers only
    pub role_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

/// JSON for a user document with the password hash removed
pub fn public_user(document: &Document) -> Value {
    let mut json = document.to_json();
    if let Value::Object(map) = &mut json {
        map.remove(HASH_FIELD);
        map.remove(PASSWORD_FIELD);
    }
    json
}

/// Role of a stored user; documents without a numeric role are treated as having none
pub fn role_of(document: &Document) -> Option<i64> {
    document.get_i64(ROLE_FIELD)
}
