//! Máquina de estados de revisión
//!
//! Empresas, documentos y DPCs comparten el mismo ciclo de vida:
//! `pending → approved | rejected`. Ambos destinos son terminales.

use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::fmt;
use std::str::FromStr;

use crate::utils::errors::AppError;

/// Estado de revisión - mapea al ENUM review_status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "review_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReviewStatus::Pending)
    }

    /// Única función de transición del sistema
    pub fn transition(self, decision: ReviewDecision) -> Result<ReviewStatus, AppError> {
        match (self, decision) {
            (ReviewStatus::Pending, ReviewDecision::Approve) => Ok(ReviewStatus::Approved),
            (ReviewStatus::Pending, ReviewDecision::Reject) => Ok(ReviewStatus::Rejected),
            (current @ (ReviewStatus::Approved | ReviewStatus::Rejected), _) => {
                Err(AppError::InvalidTransition(format!(
                    "status is already '{}' and cannot change to '{}'",
                    current,
                    decision.target()
                )))
            }
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decisión de un administrador sobre un registro pendiente
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn target(self) -> ReviewStatus {
        match self {
            ReviewDecision::Approve => ReviewStatus::Approved,
            ReviewDecision::Reject => ReviewStatus::Rejected,
        }
    }
}

impl FromStr for ReviewDecision {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "approved" => Ok(ReviewDecision::Approve),
            "rejected" => Ok(ReviewDecision::Reject),
            other => Err(AppError::InvalidTransition(format!(
                "'{}' is not a valid target status (expected 'approved' or 'rejected')",
                other
            ))),
        }
    }
}

impl From<bool> for ReviewDecision {
    fn from(approved: bool) -> Self {
        if approved {
            ReviewDecision::Approve
        } else {
            ReviewDecision::Reject
        }
    }
}
