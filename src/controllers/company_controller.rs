use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::dto::company_dto::{
    into_document, CompanyResponse, CreateCompanyRequest, NewAddressRequest, NewDocumentRequest,
};
use crate::models::auth::AuthContext;
use crate::models::{Company, CompanyAddress, CompanyPatch, Document, UserRole};
use crate::repositories::Store;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};

pub struct CompanyController {
    store: Arc<dyn Store>,
}

impl CompanyController {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    /// Alta directa por un admin; la empresa empieza pendiente
    pub async fn create(&self, context: &AuthContext, request: CreateCompanyRequest) -> AppResult<CompanyResponse> {
        context.require(&[UserRole::Admin], "create companies")?;

        let company = self
            .store
            .create_company(Company::new(request.name, request.tax_info))
            .await?;
        info!("🏢 Empresa creada por admin: {}", company.id);
        Ok(CompanyResponse::from(company))
    }

    pub async fn list(&self, context: &AuthContext) -> AppResult<Vec<CompanyResponse>> {
        context.require(&[UserRole::Admin], "list companies")?;

        let companies = self.store.list_companies().await?;
        Ok(companies.into_iter().map(CompanyResponse::from).collect())
    }

    async fn find_visible(&self, context: &AuthContext, id: Uuid) -> AppResult<Company> {
        self.store
            .find_company(id, context.scope())
            .await?
            .ok_or_else(|| not_found_error("Company"))
    }

    pub async fn get(&self, context: &AuthContext, id: Uuid) -> AppResult<CompanyResponse> {
        self.find_visible(context, id).await.map(CompanyResponse::from)
    }

    pub async fn update(&self, context: &AuthContext, id: Uuid, patch: CompanyPatch) -> AppResult<CompanyResponse> {
        context.require(&[UserRole::Admin, UserRole::CompanyAdmin], "update companies")?;

        let company = self
            .store
            .update_company(id, context.scope(), patch)
            .await?
            .ok_or_else(|| not_found_error("Company"))?;
        Ok(CompanyResponse::from(company))
    }

    pub async fn list_documents(&self, context: &AuthContext, id: Uuid) -> AppResult<Vec<Document>> {
        let company = self.find_visible(context, id).await?;
        self.store.list_documents(Some(company.id), None).await
    }

    pub async fn add_document(
        &self,
        context: &AuthContext,
        id: Uuid,
        request: NewDocumentRequest,
    ) -> AppResult<Document> {
        context.require(&[UserRole::Admin, UserRole::CompanyAdmin], "upload documents")?;
        let company = self.find_visible(context, id).await?;

        let document = self.store.add_document(into_document(request, company.id)).await?;
        info!("📄 Documento {} añadido a la empresa {}", document.id, company.id);
        Ok(document)
    }

    pub async fn list_addresses(&self, context: &AuthContext, id: Uuid) -> AppResult<Vec<CompanyAddress>> {
        let company = self.find_visible(context, id).await?;
        self.store.list_addresses(company.id).await
    }

    pub async fn add_address(
        &self,
        context: &AuthContext,
        id: Uuid,
        request: NewAddressRequest,
    ) -> AppResult<CompanyAddress> {
        context.require(&[UserRole::Admin, UserRole::CompanyAdmin], "add addresses")?;
        let company = self.find_visible(context, id).await?;

        self.store.add_address(request.into_address(company.id)).await
    }
}
