//! Modelo de Product

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_not_blank;

/// Detalles libres de un producto: objeto JSON sin claves obligatorias
pub type DetailsMap = Map<String, Value>;

/// Product - mapea exactamente a la tabla products
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub details: Json<DetailsMap>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(company_id: Uuid, name: String, details: DetailsMap) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id,
            name: name.trim().to_string(),
            details: Json(details),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(details) = patch.details {
            self.details = Json(details);
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        self.updated_at = Utc::now();
    }
}

/// Cambios parciales sobre un producto
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub name: Option<String>,
    pub details: Option<DetailsMap>,
    pub active: Option<bool>,
}
