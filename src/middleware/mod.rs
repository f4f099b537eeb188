//! Middleware del sistema
//!
//! Autenticación, CORS y el extractor de cuerpos JSON validados.

pub mod auth;
pub mod cors;
pub mod validated_json;

pub use auth::{admin_only_middleware, auth_middleware};
pub use cors::cors_layer;
pub use validated_json::ValidatedJson;
