use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::utils::errors::{forbidden_error, AppError};

/// Claims del token de acceso
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub sub: Uuid,
    pub role: UserRole,
    pub company_id: Uuid,
    pub exp: i64,
    pub iat: i64,
}

/// Propósito de un token de un solo uso
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "email_verification",
            TokenPurpose::PasswordReset => "password_reset",
        }
    }
}

/// Claims de un token de acción (verificación de email, reseteo de contraseña)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionClaims {
    pub sub: Uuid,
    pub purpose: TokenPurpose,
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

/// Efecto que se aplica al consumir un token de acción
#[derive(Debug, Clone)]
pub enum TokenEffect {
    ActivateUser,
    ReplacePassword { password_hash: String },
}

/// Alcance de lectura/escritura derivado del rol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    All,
    Company(Uuid),
}

impl TenantScope {
    pub fn includes(&self, company_id: Uuid) -> bool {
        match self {
            TenantScope::All => true,
            TenantScope::Company(id) => *id == company_id,
        }
    }

    pub fn company_id(&self) -> Option<Uuid> {
        match self {
            TenantScope::All => None,
            TenantScope::Company(id) => Some(*id),
        }
    }
}

/// Contexto del llamante extraído del token; se pasa explícitamente a los controladores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: UserRole,
    pub company_id: Uuid,
}

impl AuthContext {
    pub fn scope(&self) -> TenantScope {
        if self.role == UserRole::Admin {
            TenantScope::All
        } else {
            TenantScope::Company(self.company_id)
        }
    }

    /// Exigir uno de los roles indicados
    pub fn require(&self, roles: &[UserRole], operation: &str) -> Result<(), AppError> {
        if authorize(roles, self.role) {
            Ok(())
        } else {
            Err(forbidden_error(operation))
        }
    }
}

impl From<AccessClaims> for AuthContext {
    fn from(claims: AccessClaims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            company_id: claims.company_id,
        }
    }
}

/// Pertenencia exacta al conjunto de roles; no hay jerarquía
pub fn authorize(required: &[UserRole], actual: UserRole) -> bool {
    required.contains(&actual)
}
