//! Modelo de CompanyAddress

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Tipo de dirección - mapea al ENUM address_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "address_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Headquarters,
    Branch,
    Factory,
    Warehouse,
}

/// Dirección de una empresa - mapea a la tabla company_addresses
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAddress {
    pub id: Uuid,
    pub company_id: Uuid,
    #[serde(rename = "type")]
    pub address_type: AddressType,
    pub street: String,
    pub city: String,
    pub district: Option<String>,
    pub postal_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyAddress {
    pub fn new(
        company_id: Uuid,
        address_type: AddressType,
        street: String,
        city: String,
        district: Option<String>,
        postal_code: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id,
            address_type,
            street,
            city,
            district,
            postal_code,
            created_at: now,
            updated_at: now,
        }
    }
}
