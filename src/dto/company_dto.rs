use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::user_dto::UserResponse;
use crate::models::{
    AddressType, Company, CompanyAddress, Document, DocumentInfo, ReviewStatus, TaxInfo,
};
use crate::utils::validation::{validate_not_blank, POSTAL_CODE_RE};

/// Alta de empresa por un administrador de plataforma
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub name: String,

    #[validate]
    pub tax_info: TaxInfo,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAddressRequest {
    #[serde(rename = "type")]
    pub address_type: AddressType,

    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub street: String,

    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub city: String,

    #[validate(length(max = 100))]
    pub district: Option<String>,

    #[validate(regex(path = "POSTAL_CODE_RE", message = "invalid postal code"))]
    pub postal_code: Option<String>,
}

impl NewAddressRequest {
    pub fn into_address(self, company_id: Uuid) -> CompanyAddress {
        CompanyAddress::new(
            company_id,
            self.address_type,
            self.street.trim().to_string(),
            self.city.trim().to_string(),
            self.district,
            self.postal_code,
        )
    }
}

/// Mismo bloque que `DocumentInfo`; los documentos nuevos quedan pendientes
pub type NewDocumentRequest = DocumentInfo;

pub fn into_document(info: NewDocumentRequest, company_id: Uuid) -> Document {
    Document::new(company_id, info)
}

// Response de empresa
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: Uuid,
    pub name: String,
    pub tax_info: TaxInfo,
    pub status: ReviewStatus,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            approved: company.approved(),
            id: company.id,
            name: company.name,
            tax_info: company.tax_info.0,
            status: company.status,
            created_at: company.created_at,
            updated_at: company.updated_at,
        }
    }
}

/// Empresa con sus usuarios y documentos (vista de administración)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetailResponse {
    #[serde(flatten)]
    pub company: CompanyResponse,
    pub users: Vec<UserResponse>,
    pub documents: Vec<Document>,
}

/// Documento pendiente junto con su empresa
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentWithCompany {
    #[serde(flatten)]
    pub document: Document,
    pub company: Option<CompanyResponse>,
}
