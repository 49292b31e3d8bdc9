// Utility modules for the Arcadia API

pub mod api_error;
pub mod ids;
pub mod image_ids;
pub mod password;
pub mod validation;

pub use api_error::{ApiError, ApiResult};
pub use ids::generate_id;
pub use password::{hash_password, verify_password, PasswordError};
pub use validation::{check_required_fields, id_list_body, object_body};
