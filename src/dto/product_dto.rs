use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{DetailsMap, Dpc, Product};
use crate::utils::validation::validate_not_blank;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub name: String,

    #[serde(default)]
    pub details: DetailsMap,
}

/// Producto con sus DPCs
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithDpcs {
    #[serde(flatten)]
    pub product: Product,
    pub dpcs: Vec<Dpc>,
}
