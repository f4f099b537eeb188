//! Hashing de contraseñas con bcrypt

use bcrypt::{hash, verify};

use crate::utils::errors::AppError;

/// Generar hash bcrypt con el coste configurado
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost).map_err(|e| AppError::Hash(format!("Error hashing password: {}", e)))
}

/// Comparar una contraseña en claro con su hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    verify(password, password_hash)
        .map_err(|e| AppError::Hash(format!("Error verifying password: {}", e)))
}
