// Middleware modules for the Arcadia API

pub mod auth;
pub mod cors;

pub use auth::{authorize, Identity};
pub use cors::dynamic_cors_middleware;
