//! Modelo de User
//!
//! Este módulo contiene el struct User, sus roles y el bloque de datos personales.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{validate_not_blank, validate_phone};

/// Rol del usuario - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    CompanyAdmin,
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::CompanyAdmin => "company_admin",
            UserRole::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Datos personales opcionales (columna JSONB personal_info)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub first_name: String,

    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub last_name: String,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[validate(length(max = 100))]
    pub title: Option<String>,
}

/// User - mapea exactamente a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub personal_info: Option<Json<PersonalInfo>>,
    pub company_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: String,
        password_hash: String,
        role: UserRole,
        company_id: Uuid,
        personal_info: Option<PersonalInfo>,
        active: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            role,
            personal_info: personal_info.map(Json),
            company_id,
            active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fusión parcial; `company_id` es inmutable y no forma parte del patch
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(personal_info) = patch.personal_info {
            self.personal_info = Some(Json(personal_info));
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        self.updated_at = Utc::now();
    }
}

/// Cambios parciales sobre un usuario
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[validate]
    pub personal_info: Option<PersonalInfo>,
    pub active: Option<bool>,
}
