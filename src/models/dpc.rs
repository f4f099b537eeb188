//! Modelo de DPC (Digital Product Certificate)
//!
//! Un DPC pertenece a un único producto, se crea pendiente y solo un
//! administrador lo aprueba o rechaza. Al aprobarse recibe el hash de
//! anclaje del ledger, que ya no cambia.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::status::ReviewStatus;
use crate::utils::validation::validate_not_blank;

/// Detalles de certificación (columna JSONB certification_details).
///
/// `standard` es obligatorio; cualquier otra clave se conserva en `attributes`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificationDetails {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub standard: String,

    #[validate(length(max = 255))]
    pub certifier: Option<String>,

    pub valid_until: Option<NaiveDate>,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// DPC - mapea exactamente a la tabla dpcs
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Dpc {
    pub id: Uuid,
    pub product_id: Uuid,
    pub certification_details: Json<CertificationDetails>,
    pub status: ReviewStatus,
    pub blockchain_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dpc {
    pub fn new(product_id: Uuid, certification_details: CertificationDetails) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            product_id,
            certification_details: Json(certification_details),
            status: ReviewStatus::Pending,
            blockchain_hash: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Hecho que se ancla en el ledger al aprobar un DPC
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificationRecord {
    pub dpc_id: Uuid,
    pub product_id: Uuid,
    pub certification_details: CertificationDetails,
    pub timestamp: DateTime<Utc>,
}

impl CertificationRecord {
    pub fn from_dpc(dpc: &Dpc, timestamp: DateTime<Utc>) -> Self {
        Self {
            dpc_id: dpc.id,
            product_id: dpc.product_id,
            certification_details: dpc.certification_details.0.clone(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_certification_details_keep_extra_attributes() {
        let details: CertificationDetails = serde_json::from_value(json!({
            "standard": "EN 71-3",
            "validUntil": "2027-01-31",
            "batch": "B-42"
        }))
        .unwrap();

        assert_eq!(details.standard, "EN 71-3");
        assert_eq!(details.valid_until, NaiveDate::from_ymd_opt(2027, 1, 31));
        assert_eq!(details.attributes.get("batch"), Some(&json!("B-42")));

        let back = serde_json::to_value(&details).unwrap();
        assert_eq!(back["batch"], "B-42");
    }

    #[test]
    fn test_new_dpc_is_pending_without_hash() {
        let details = CertificationDetails {
            standard: "CE".to_string(),
            certifier: None,
            valid_until: None,
            attributes: Map::new(),
        };
        let dpc = Dpc::new(Uuid::new_v4(), details);
        assert_eq!(dpc.status, ReviewStatus::Pending);
        assert!(dpc.blockchain_hash.is_none());
    }
}
