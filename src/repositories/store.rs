//! Contrato de persistencia
//!
//! Cada operación compuesta (registro, consumo de tokens, revisiones) es
//! atómica en la implementación: o se escribe todo o no se escribe nada.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::auth::{ActionClaims, TenantScope, TokenEffect};
use crate::models::{
    Company, CompanyAddress, CompanyPatch, Document, Dpc, Product, ProductPatch, ReviewStatus,
    User, UserPatch,
};
use crate::utils::errors::AppResult;

/// Alta completa de una empresa con su primer usuario
#[derive(Debug, Clone)]
pub struct Registration {
    pub company: Company,
    pub user: User,
    pub addresses: Vec<CompanyAddress>,
    pub documents: Vec<Document>,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Inserta empresa, usuario, direcciones y documentos en una sola transacción.
    /// Falla con `DuplicateEmail` si el email ya existe.
    async fn register_company(&self, registration: Registration) -> AppResult<Registration>;

    // ---- Users ----
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_user(&self, id: Uuid, scope: TenantScope) -> AppResult<Option<User>>;
    async fn create_user(&self, user: User) -> AppResult<User>;
    async fn list_users(&self, scope: TenantScope) -> AppResult<Vec<User>>;
    async fn update_user(&self, id: Uuid, scope: TenantScope, patch: UserPatch) -> AppResult<Option<User>>;
    async fn delete_user(&self, id: Uuid, scope: TenantScope) -> AppResult<bool>;

    /// Marca el `jti` como consumido y aplica su efecto sobre el usuario.
    /// Un `jti` ya consumido o un usuario inexistente dan `InvalidOrExpiredToken`.
    async fn consume_token(&self, claims: &ActionClaims, effect: TokenEffect) -> AppResult<User>;

    // ---- Companies ----
    async fn create_company(&self, company: Company) -> AppResult<Company>;
    async fn find_company(&self, id: Uuid, scope: TenantScope) -> AppResult<Option<Company>>;
    async fn list_companies(&self) -> AppResult<Vec<Company>>;
    async fn update_company(
        &self,
        id: Uuid,
        scope: TenantScope,
        patch: CompanyPatch,
    ) -> AppResult<Option<Company>>;
    /// Escritura condicional: solo si la empresa sigue `pending`
    async fn review_company(&self, id: Uuid, status: ReviewStatus) -> AppResult<Option<Company>>;

    // ---- Addresses ----
    async fn list_addresses(&self, company_id: Uuid) -> AppResult<Vec<CompanyAddress>>;
    async fn add_address(&self, address: CompanyAddress) -> AppResult<CompanyAddress>;

    // ---- Documents ----
    async fn list_documents(
        &self,
        company_id: Option<Uuid>,
        status: Option<ReviewStatus>,
    ) -> AppResult<Vec<Document>>;
    async fn add_document(&self, document: Document) -> AppResult<Document>;
    async fn find_document(&self, id: Uuid) -> AppResult<Option<Document>>;
    /// Escritura condicional: solo si el documento sigue `pending`
    async fn review_document(&self, id: Uuid, status: ReviewStatus) -> AppResult<Option<Document>>;

    // ---- Products ----
    async fn create_product(&self, product: Product) -> AppResult<Product>;
    async fn list_products(&self, scope: TenantScope) -> AppResult<Vec<Product>>;
    async fn find_product(&self, id: Uuid, scope: TenantScope) -> AppResult<Option<Product>>;
    async fn update_product(
        &self,
        id: Uuid,
        scope: TenantScope,
        patch: ProductPatch,
    ) -> AppResult<Option<Product>>;
    /// Borrado físico; arrastra los DPCs del producto
    async fn delete_product(&self, id: Uuid, scope: TenantScope) -> AppResult<bool>;

    // ---- DPCs ----
    async fn create_dpc(&self, dpc: Dpc) -> AppResult<Dpc>;
    async fn list_dpcs(&self, scope: TenantScope, status: Option<ReviewStatus>) -> AppResult<Vec<Dpc>>;
    async fn list_dpcs_for_products(&self, product_ids: &[Uuid]) -> AppResult<Vec<Dpc>>;
    async fn find_dpc(&self, id: Uuid, scope: TenantScope) -> AppResult<Option<Dpc>>;
    /// Escritura condicional: solo si el DPC sigue `pending`. El hash se escribe
    /// únicamente junto con `approved`.
    async fn review_dpc(
        &self,
        id: Uuid,
        status: ReviewStatus,
        blockchain_hash: Option<String>,
    ) -> AppResult<Option<Dpc>>;
}
