//! Modelo de Document
//!
//! Documentos de cumplimiento adjuntos a una empresa; cada uno se revisa
//! por separado.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::status::ReviewStatus;
use crate::utils::validation::validate_not_blank;

/// Metadatos del documento (columna JSONB document_info)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub document_type: String,

    #[validate(length(min = 1, max = 1000), custom = "validate_not_blank")]
    pub file_path: String,

    #[validate(length(max = 255))]
    pub original_name: Option<String>,
}

/// Document - mapea exactamente a la tabla documents
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub company_id: Uuid,
    pub document_info: Json<DocumentInfo>,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(company_id: Uuid, document_info: DocumentInfo) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id,
            document_info: Json(document_info),
            status: ReviewStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
