use serde::Deserialize;
use validator::Validate;

use crate::models::ReviewDecision;
use crate::utils::errors::AppError;

/// Valor de estado tal como llega: string o, para empresas, booleano heredado
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatusValue {
    Flag(bool),
    Text(String),
}

#[derive(Debug, Deserialize, Validate)]
pub struct StatusUpdateRequest {
    pub status: StatusValue,
}

impl StatusUpdateRequest {
    /// Decisión para documentos y DPCs: solo la forma textual
    pub fn decision(&self) -> Result<ReviewDecision, AppError> {
        match &self.status {
            StatusValue::Text(value) => value.parse(),
            StatusValue::Flag(_) => Err(AppError::InvalidTransition(
                "status must be 'approved' or 'rejected'".to_string(),
            )),
        }
    }

    /// Decisión para empresas: texto o booleano
    pub fn company_decision(&self) -> Result<ReviewDecision, AppError> {
        match &self.status {
            StatusValue::Text(value) => value.parse(),
            StatusValue::Flag(flag) => Ok(ReviewDecision::from(*flag)),
        }
    }
}
