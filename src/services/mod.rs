// Business services for the Arcadia API

pub mod bootstrap;
pub mod jwt;
pub mod media;

pub use bootstrap::{ensure_admin, BootstrapOutcome};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use media::{CloudinaryClient, MediaError, MediaHost, UploadedAsset};
