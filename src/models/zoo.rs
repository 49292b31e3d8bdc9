// Zoo resource shapes
// Documents are schemaless in the store; these types describe the documented
// fields for the OpenAPI document and the image upload response.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "Xk2v9QpLr7TmWc4bNz1a",
    "prenom": "Rafiki",
    "race_id": "r8Jd2kLq0PzXc5VbN3mA",
    "habitat_id": "h3Zp9LkQ2wXr7TcVb1nM",
    "nb_vues": 12,
    "images_id": ["i1", "i2"]
}))]
pub struct Animal {
    pub id: String,
    pub prenom: String,
    pub race_id: String,
    pub habitat_id: String,
    /// Incremented on every detail read
    #[serde(default)]
    pub nb_vues: i64,
    #[serde(default)]
    pub images_id: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Habitat {
    pub id: String,
    pub nom: String,
    pub description: String,
    /// Veterinarian's note on the habitat
    pub commentaire: String,
    #[serde(default)]
    pub images_id: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Race {
    pub id: String,
    pub nom_commun: String,
    pub nom_scientifique: String,
    pub type_habitat: String,
    pub famille: String,
    pub origine: String,
    #[serde(default)]
    pub images_id: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Service {
    pub id: String,
    pub nom: String,
    pub description: String,
    #[serde(default)]
    pub images_id: Vec<String>,
}

/// Veterinary report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Report {
    pub id: String,
    pub nom: String,
    pub description: String,
    #[serde(default)]
    pub images_id: Vec<String>,
}

/// Visitor review; hidden until an admin toggles it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: String,
    pub pseudo: String,
    pub commentaire: String,
    #[serde(default)]
    pub is_visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub pseudo: String,
    pub commentaire: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Image {
    pub id: String,
    pub label: String,
    pub url: String,
    /// Asset id on the media host
    pub public_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Body returned by create/update/image-list operations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MutationResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    /// Renewed access token
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}
