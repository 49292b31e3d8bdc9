// Token claims and staff roles

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Staff access level stored in `role_id` and carried in tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Veterinarian,
    Employee,
}

impl Role {
    pub fn id(self) -> i64 {
        match self {
            Role::Admin => 0,
            Role::Veterinarian => 1,
            Role::Employee => 2,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(Role::Admin),
            1 => Some(Role::Veterinarian),
            2 => Some(Role::Employee),
            _ => None,
        }
    }
}

/// Access token claims: `{id, role, iat, exp}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User document id
    pub id: String,

    /// Numeric role (see [`Role`])
    pub role: i64,

    /// Issued at (Unix epoch seconds)
    pub iat: u64,

    /// Expires at (Unix epoch seconds)
    pub exp: u64,
}

impl Claims {
    pub fn new(id: String, role: i64, issued_at: u64, lifetime: u64) -> Self {
        Self {
            id,
            role,
            iat: issued_at,
            exp: issued_at + lifetime,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username est manquant"))]
    pub username: String,

    #[validate(length(min = 1, message = "password est manquant"))]
    pub password: String,
}
