//! Modelo de Company
//!
//! Este módulo contiene el struct Company, su bloque fiscal y los cambios
//! parciales admitidos. Mapea exactamente a la tabla companies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::status::ReviewStatus;
use crate::utils::validation::{validate_not_blank, MERSIS_NO_RE, TAX_NUMBER_RE};

/// Información fiscal de la empresa (columna JSONB tax_info)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaxInfo {
    #[validate(regex(path = "TAX_NUMBER_RE", message = "tax number must have 10 or 11 digits"))]
    pub tax_number: String,

    #[validate(length(min = 2, max = 100))]
    pub tax_office: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub trade_registry_no: Option<String>,

    #[validate(regex(path = "MERSIS_NO_RE", message = "register number must have 16 digits"))]
    pub mersis_no: Option<String>,
}

/// Company principal - mapea exactamente a la tabla companies
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub tax_info: Json<TaxInfo>,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Nueva empresa; toda empresa empieza pendiente de aprobación
    pub fn new(name: String, tax_info: TaxInfo) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            tax_info: Json(tax_info),
            status: ReviewStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn approved(&self) -> bool {
        self.status == ReviewStatus::Approved
    }

    /// Fusión parcial: solo los campos presentes sobrescriben
    pub fn apply(&mut self, patch: CompanyPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(tax_info) = patch.tax_info {
            self.tax_info = Json(tax_info);
        }
        self.updated_at = Utc::now();
    }
}

/// Cambios parciales sobre el perfil de la empresa. El estado no es editable aquí.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPatch {
    #[validate(length(min = 2, max = 255), custom = "validate_not_blank")]
    pub name: Option<String>,

    #[validate]
    pub tax_info: Option<TaxInfo>,
}
