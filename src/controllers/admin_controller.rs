//! Revisión de empresas, documentos y DPCs por el administrador de plataforma
//!
//! Las tres revisiones siguen la misma máquina de estados (`ReviewStatus`).
//! La aprobación de un DPC ancla primero el certificado en el ledger y
//! después escribe estado y hash con una actualización condicional.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::dto::admin_dto::StatusUpdateRequest;
use crate::dto::company_dto::{CompanyDetailResponse, CompanyResponse, DocumentWithCompany};
use crate::dto::dpc_dto::DpcWithProduct;
use crate::dto::user_dto::UserResponse;
use crate::models::auth::TenantScope;
use crate::models::{CertificationRecord, Document, Dpc, ReviewStatus};
use crate::repositories::Store;
use crate::services::LedgerService;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};

fn reviewed_concurrently(resource: &str) -> AppError {
    AppError::InvalidTransition(format!("{} was already reviewed", resource))
}

pub struct AdminController {
    store: Arc<dyn Store>,
    ledger: LedgerService,
}

impl AdminController {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            ledger: state.ledger.clone(),
        }
    }

    pub async fn list_companies(&self) -> AppResult<Vec<CompanyDetailResponse>> {
        let companies = self.store.list_companies().await?;
        let mut out = Vec::with_capacity(companies.len());

        for company in companies {
            let users = self
                .store
                .list_users(TenantScope::Company(company.id))
                .await?
                .into_iter()
                .map(UserResponse::from)
                .collect();
            let documents = self.store.list_documents(Some(company.id), None).await?;
            out.push(CompanyDetailResponse {
                company: CompanyResponse::from(company),
                users,
                documents,
            });
        }

        Ok(out)
    }

    pub async fn review_company(&self, id: Uuid, request: StatusUpdateRequest) -> AppResult<CompanyResponse> {
        let decision = request.company_decision()?;
        let company = self
            .store
            .find_company(id, TenantScope::All)
            .await?
            .ok_or_else(|| not_found_error("Company"))?;
        let target = company.status.transition(decision)?;

        let company = self
            .store
            .review_company(id, target)
            .await?
            .ok_or_else(|| reviewed_concurrently("Company"))?;

        info!("🏢 Empresa {} -> {}", company.id, company.status);
        Ok(CompanyResponse::from(company))
    }

    pub async fn list_pending_documents(&self) -> AppResult<Vec<DocumentWithCompany>> {
        let documents = self
            .store
            .list_documents(None, Some(ReviewStatus::Pending))
            .await?;
        let mut out = Vec::with_capacity(documents.len());

        for document in documents {
            let company = self
                .store
                .find_company(document.company_id, TenantScope::All)
                .await?
                .map(CompanyResponse::from);
            out.push(DocumentWithCompany { document, company });
        }

        Ok(out)
    }

    pub async fn review_document(&self, id: Uuid, request: StatusUpdateRequest) -> AppResult<Document> {
        let decision = request.decision()?;
        let document = self
            .store
            .find_document(id)
            .await?
            .ok_or_else(|| not_found_error("Document"))?;
        let target = document.status.transition(decision)?;

        let document = self
            .store
            .review_document(id, target)
            .await?
            .ok_or_else(|| reviewed_concurrently("Document"))?;

        info!("📄 Documento {} -> {}", document.id, document.status);
        Ok(document)
    }

    pub async fn list_pending_dpcs(&self) -> AppResult<Vec<DpcWithProduct>> {
        let dpcs = self
            .store
            .list_dpcs(TenantScope::All, Some(ReviewStatus::Pending))
            .await?;
        let mut out = Vec::with_capacity(dpcs.len());

        for dpc in dpcs {
            let product = self.store.find_product(dpc.product_id, TenantScope::All).await?;
            out.push(DpcWithProduct { dpc, product });
        }

        Ok(out)
    }

    /// Aprobar o rechazar un DPC.
    ///
    /// Si el ledger falla o no responde a tiempo no se escribe nada y el
    /// DPC sigue `pending`, sin hash.
    pub async fn review_dpc(&self, id: Uuid, request: StatusUpdateRequest) -> AppResult<Dpc> {
        let decision = request.decision()?;
        let dpc = self
            .store
            .find_dpc(id, TenantScope::All)
            .await?
            .ok_or_else(|| not_found_error("DPC"))?;
        let target = dpc.status.transition(decision)?;

        let blockchain_hash = match target {
            ReviewStatus::Approved => {
                let record = CertificationRecord::from_dpc(&dpc, Utc::now());
                Some(self.ledger.anchor(&record).await?)
            }
            _ => None,
        };

        let dpc = self
            .store
            .review_dpc(id, target, blockchain_hash)
            .await?
            .ok_or_else(|| reviewed_concurrently("DPC"))?;

        info!("📜 DPC {} -> {}", dpc.id, dpc.status);
        Ok(dpc)
    }
}
