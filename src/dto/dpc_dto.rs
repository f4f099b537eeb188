use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{CertificationDetails, Dpc, Product};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDpcRequest {
    pub product_id: Uuid,

    #[validate]
    pub certification_details: CertificationDetails,
}

/// DPC pendiente junto con su producto
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DpcWithProduct {
    #[serde(flatten)]
    pub dpc: Dpc,
    pub product: Option<Product>,
}

/// Resultado de la verificación pública de un hash
#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub hash: String,
    pub valid: bool,
}
