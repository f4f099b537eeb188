//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación
//! y hashing de contraseñas.

pub mod errors;
pub mod password;
pub mod validation;

pub use errors::{AppError, AppResult};
