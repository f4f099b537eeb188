use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{PersonalInfo, User, UserRole};

/// Alta de usuario dentro de la propia empresa.
/// El rol no se acepta en la petición: siempre es `user`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "password must have at least 6 characters"))]
    pub password: String,

    #[validate]
    pub personal_info: Option<PersonalInfo>,
}

/// Usuario sin hash de contraseña
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub personal_info: Option<PersonalInfo>,
    pub company_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            personal_info: user.personal_info.map(|p| p.0),
            company_id: user.company_id,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
