//! Utilidades de validación
//!
//! Funciones `custom` para `validator` y expresiones regulares compartidas
//! por los DTOs de registro, empresas y direcciones.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Número fiscal: 10 dígitos (persona jurídica) u 11 (persona física)
    pub static ref TAX_NUMBER_RE: Regex = Regex::new(r"^[0-9]{10,11}$").unwrap();

    /// Número MERSIS: 16 dígitos
    pub static ref MERSIS_NO_RE: Regex = Regex::new(r"^[0-9]{16}$").unwrap();

    /// Código postal: 4 a 10 caracteres alfanuméricos, espacios o guiones
    pub static ref POSTAL_CODE_RE: Regex = Regex::new(r"^[A-Za-z0-9 \-]{4,10}$").unwrap();
}

/// Validar que un string no esté vacío (ignorando espacios)
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono (básico)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if !(10..=15).contains(&digits) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        error.message = Some("phone must contain 10 to 15 digits".into());
        return Err(error);
    }
    Ok(())
}

/// Normalizar un email para búsquedas y unicidad
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}
