pub mod auth;
pub mod user;
pub mod zoo;

// Re-export common types
pub use auth::{Claims, LoginRequest, Role};
pub use user::{public_user, CreateUserRequest, LoginResponse, UpdateUserRequest, UserResponse};
pub use zoo::{
    Animal, CreateReviewRequest, ErrorResponse, Habitat, Image, MessageResponse,
    MutationResponse, Race, Report, Review, Service,
};
