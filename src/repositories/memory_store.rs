//! Implementación en memoria del `Store`
//!
//! Se usa en desarrollo sin `DATABASE_URL` y en los tests. Todas las tablas
//! viven bajo un único `RwLock`, así que cada operación compuesta se aplica
//! entera o no se aplica.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::auth::{ActionClaims, TenantScope, TokenEffect};
use crate::models::{
    Company, CompanyAddress, CompanyPatch, Document, Dpc, Product, ProductPatch, ReviewStatus,
    User, UserPatch,
};
use crate::repositories::store::{Registration, Store};
use crate::utils::errors::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    companies: HashMap<Uuid, Company>,
    users: HashMap<Uuid, User>,
    addresses: HashMap<Uuid, CompanyAddress>,
    documents: HashMap<Uuid, Document>,
    products: HashMap<Uuid, Product>,
    dpcs: HashMap<Uuid, Dpc>,
    consumed_tokens: HashSet<Uuid>,
}

impl Tables {
    fn email_taken(&self, email: &str) -> bool {
        self.users.values().any(|u| u.email == email)
    }

    fn product_company(&self, product_id: Uuid) -> Option<Uuid> {
        self.products.get(&product_id).map(|p| p.company_id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Orden de listado: más reciente primero
fn newest_first<T, F>(mut items: Vec<T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<Utc>,
{
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    items
}

#[async_trait]
impl Store for MemoryStore {
    async fn register_company(&self, registration: Registration) -> AppResult<Registration> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&registration.user.email) {
            return Err(AppError::DuplicateEmail);
        }

        let Registration {
            company,
            user,
            addresses,
            documents,
        } = registration;

        let addresses: Vec<CompanyAddress> = addresses
            .into_iter()
            .map(|mut a| {
                a.company_id = company.id;
                a
            })
            .collect();
        let documents: Vec<Document> = documents
            .into_iter()
            .map(|mut d| {
                d.company_id = company.id;
                d
            })
            .collect();
        let mut user = user;
        user.company_id = company.id;

        tables.companies.insert(company.id, company.clone());
        tables.users.insert(user.id, user.clone());
        for address in &addresses {
            tables.addresses.insert(address.id, address.clone());
        }
        for document in &documents {
            tables.documents.insert(document.id, document.clone());
        }

        Ok(Registration {
            company,
            user,
            addresses,
            documents,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: Uuid, scope: TenantScope) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .get(&id)
            .filter(|u| scope.includes(u.company_id))
            .cloned())
    }

    async fn create_user(&self, user: User) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email) {
            return Err(AppError::DuplicateEmail);
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&self, scope: TenantScope) -> AppResult<Vec<User>> {
        let tables = self.tables.read().await;
        let users = tables
            .users
            .values()
            .filter(|u| scope.includes(u.company_id))
            .cloned()
            .collect();
        Ok(newest_first(users, |u| u.created_at))
    }

    async fn update_user(&self, id: Uuid, scope: TenantScope, patch: UserPatch) -> AppResult<Option<User>> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&id) {
            Some(user) if scope.includes(user.company_id) => {
                user.apply(patch);
                Ok(Some(user.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_user(&self, id: Uuid, scope: TenantScope) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let visible = tables
            .users
            .get(&id)
            .map(|u| scope.includes(u.company_id))
            .unwrap_or(false);
        if visible {
            tables.users.remove(&id);
        }
        Ok(visible)
    }

    async fn consume_token(&self, claims: &ActionClaims, effect: TokenEffect) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.consumed_tokens.contains(&claims.jti) {
            return Err(AppError::InvalidOrExpiredToken);
        }

        let user = tables
            .users
            .get_mut(&claims.sub)
            .ok_or(AppError::InvalidOrExpiredToken)?;
        match effect {
            TokenEffect::ActivateUser => user.active = true,
            TokenEffect::ReplacePassword { password_hash } => user.password_hash = password_hash,
        }
        user.updated_at = Utc::now();
        let user = user.clone();

        tables.consumed_tokens.insert(claims.jti);
        Ok(user)
    }

    async fn create_company(&self, company: Company) -> AppResult<Company> {
        let mut tables = self.tables.write().await;
        tables.companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn find_company(&self, id: Uuid, scope: TenantScope) -> AppResult<Option<Company>> {
        if !scope.includes(id) {
            return Ok(None);
        }
        let tables = self.tables.read().await;
        Ok(tables.companies.get(&id).cloned())
    }

    async fn list_companies(&self) -> AppResult<Vec<Company>> {
        let tables = self.tables.read().await;
        let companies = tables.companies.values().cloned().collect();
        Ok(newest_first(companies, |c| c.created_at))
    }

    async fn update_company(
        &self,
        id: Uuid,
        scope: TenantScope,
        patch: CompanyPatch,
    ) -> AppResult<Option<Company>> {
        if !scope.includes(id) {
            return Ok(None);
        }
        let mut tables = self.tables.write().await;
        Ok(tables.companies.get_mut(&id).map(|company| {
            company.apply(patch);
            company.clone()
        }))
    }

    async fn review_company(&self, id: Uuid, status: ReviewStatus) -> AppResult<Option<Company>> {
        let mut tables = self.tables.write().await;
        match tables.companies.get_mut(&id) {
            Some(company) if company.status == ReviewStatus::Pending => {
                company.status = status;
                company.updated_at = Utc::now();
                Ok(Some(company.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_addresses(&self, company_id: Uuid) -> AppResult<Vec<CompanyAddress>> {
        let tables = self.tables.read().await;
        let addresses = tables
            .addresses
            .values()
            .filter(|a| a.company_id == company_id)
            .cloned()
            .collect();
        Ok(newest_first(addresses, |a| a.created_at))
    }

    async fn add_address(&self, address: CompanyAddress) -> AppResult<CompanyAddress> {
        let mut tables = self.tables.write().await;
        if !tables.companies.contains_key(&address.company_id) {
            return Err(AppError::NotFound("Company not found".to_string()));
        }
        tables.addresses.insert(address.id, address.clone());
        Ok(address)
    }

    async fn list_documents(
        &self,
        company_id: Option<Uuid>,
        status: Option<ReviewStatus>,
    ) -> AppResult<Vec<Document>> {
        let tables = self.tables.read().await;
        let documents = tables
            .documents
            .values()
            .filter(|d| company_id.map_or(true, |id| d.company_id == id))
            .filter(|d| status.map_or(true, |s| d.status == s))
            .cloned()
            .collect();
        Ok(newest_first(documents, |d| d.created_at))
    }

    async fn add_document(&self, document: Document) -> AppResult<Document> {
        let mut tables = self.tables.write().await;
        if !tables.companies.contains_key(&document.company_id) {
            return Err(AppError::NotFound("Company not found".to_string()));
        }
        tables.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn find_document(&self, id: Uuid) -> AppResult<Option<Document>> {
        let tables = self.tables.read().await;
        Ok(tables.documents.get(&id).cloned())
    }

    async fn review_document(&self, id: Uuid, status: ReviewStatus) -> AppResult<Option<Document>> {
        let mut tables = self.tables.write().await;
        match tables.documents.get_mut(&id) {
            Some(document) if document.status == ReviewStatus::Pending => {
                document.status = status;
                document.updated_at = Utc::now();
                Ok(Some(document.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn create_product(&self, product: Product) -> AppResult<Product> {
        let mut tables = self.tables.write().await;
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn list_products(&self, scope: TenantScope) -> AppResult<Vec<Product>> {
        let tables = self.tables.read().await;
        let products = tables
            .products
            .values()
            .filter(|p| scope.includes(p.company_id))
            .cloned()
            .collect();
        Ok(newest_first(products, |p| p.created_at))
    }

    async fn find_product(&self, id: Uuid, scope: TenantScope) -> AppResult<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .get(&id)
            .filter(|p| scope.includes(p.company_id))
            .cloned())
    }

    async fn update_product(
        &self,
        id: Uuid,
        scope: TenantScope,
        patch: ProductPatch,
    ) -> AppResult<Option<Product>> {
        let mut tables = self.tables.write().await;
        match tables.products.get_mut(&id) {
            Some(product) if scope.includes(product.company_id) => {
                product.apply(patch);
                Ok(Some(product.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_product(&self, id: Uuid, scope: TenantScope) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let visible = tables
            .products
            .get(&id)
            .map(|p| scope.includes(p.company_id))
            .unwrap_or(false);
        if visible {
            tables.products.remove(&id);
            tables.dpcs.retain(|_, dpc| dpc.product_id != id);
        }
        Ok(visible)
    }

    async fn create_dpc(&self, dpc: Dpc) -> AppResult<Dpc> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&dpc.product_id) {
            return Err(AppError::NotFound("Product not found".to_string()));
        }
        tables.dpcs.insert(dpc.id, dpc.clone());
        Ok(dpc)
    }

    async fn list_dpcs(&self, scope: TenantScope, status: Option<ReviewStatus>) -> AppResult<Vec<Dpc>> {
        let tables = self.tables.read().await;
        let dpcs = tables
            .dpcs
            .values()
            .filter(|d| {
                tables
                    .product_company(d.product_id)
                    .map_or(false, |company_id| scope.includes(company_id))
            })
            .filter(|d| status.map_or(true, |s| d.status == s))
            .cloned()
            .collect();
        Ok(newest_first(dpcs, |d| d.created_at))
    }

    async fn list_dpcs_for_products(&self, product_ids: &[Uuid]) -> AppResult<Vec<Dpc>> {
        let tables = self.tables.read().await;
        let dpcs = tables
            .dpcs
            .values()
            .filter(|d| product_ids.contains(&d.product_id))
            .cloned()
            .collect();
        Ok(newest_first(dpcs, |d| d.created_at))
    }

    async fn find_dpc(&self, id: Uuid, scope: TenantScope) -> AppResult<Option<Dpc>> {
        let tables = self.tables.read().await;
        Ok(tables
            .dpcs
            .get(&id)
            .filter(|d| {
                tables
                    .product_company(d.product_id)
                    .map_or(false, |company_id| scope.includes(company_id))
            })
            .cloned())
    }

    async fn review_dpc(
        &self,
        id: Uuid,
        status: ReviewStatus,
        blockchain_hash: Option<String>,
    ) -> AppResult<Option<Dpc>> {
        let mut tables = self.tables.write().await;
        match tables.dpcs.get_mut(&id) {
            Some(dpc) if dpc.status == ReviewStatus::Pending => {
                dpc.status = status;
                dpc.blockchain_hash = blockchain_hash;
                dpc.updated_at = Utc::now();
                Ok(Some(dpc.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::TokenPurpose;
    use crate::models::{CertificationDetails, TaxInfo, UserRole};
    use serde_json::Map;

    fn tax_info() -> TaxInfo {
        TaxInfo {
            tax_number: "1234567890".to_string(),
            tax_office: None,
            trade_registry_no: None,
            mersis_no: None,
        }
    }

    fn registration(email: &str) -> Registration {
        let company = Company::new("Acme".to_string(), tax_info());
        let user = User::new(
            email.to_string(),
            "hash".to_string(),
            UserRole::CompanyAdmin,
            company.id,
            None,
            false,
        );
        Registration {
            company,
            user,
            addresses: vec![],
            documents: vec![],
        }
    }

    fn details() -> CertificationDetails {
        CertificationDetails {
            standard: "CE".to_string(),
            certifier: None,
            valid_until: None,
            attributes: Map::new(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_registration_writes_nothing() {
        let store = MemoryStore::new();
        store.register_company(registration("a@acme.com")).await.unwrap();

        let err = store
            .register_company(registration("a@acme.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
        assert_eq!(store.list_companies().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_token_is_consumed_once() {
        let store = MemoryStore::new();
        let saved = store.register_company(registration("a@acme.com")).await.unwrap();
        let claims = ActionClaims {
            sub: saved.user.id,
            purpose: TokenPurpose::EmailVerification,
            jti: Uuid::new_v4(),
            exp: 0,
            iat: 0,
        };

        let user = store.consume_token(&claims, TokenEffect::ActivateUser).await.unwrap();
        assert!(user.active);

        let again = store.consume_token(&claims, TokenEffect::ActivateUser).await;
        assert!(matches!(again, Err(AppError::InvalidOrExpiredToken)));
    }

    #[tokio::test]
    async fn test_review_only_applies_to_pending() {
        let store = MemoryStore::new();
        let saved = store.register_company(registration("a@acme.com")).await.unwrap();

        let approved = store
            .review_company(saved.company.id, ReviewStatus::Approved)
            .await
            .unwrap();
        assert!(approved.unwrap().approved());

        let second = store
            .review_company(saved.company.id, ReviewStatus::Rejected)
            .await
            .unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_dpc_scope_follows_product_company() {
        let store = MemoryStore::new();
        let saved = store.register_company(registration("a@acme.com")).await.unwrap();
        let product = store
            .create_product(Product::new(saved.company.id, "Toy".to_string(), Map::new()))
            .await
            .unwrap();
        let dpc = store.create_dpc(Dpc::new(product.id, details())).await.unwrap();

        let own = TenantScope::Company(saved.company.id);
        let other = TenantScope::Company(Uuid::new_v4());
        assert!(store.find_dpc(dpc.id, own).await.unwrap().is_some());
        assert!(store.find_dpc(dpc.id, other).await.unwrap().is_none());
        assert!(store.list_dpcs(other, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_product_removes_its_dpcs() {
        let store = MemoryStore::new();
        let saved = store.register_company(registration("a@acme.com")).await.unwrap();
        let product = store
            .create_product(Product::new(saved.company.id, "Toy".to_string(), Map::new()))
            .await
            .unwrap();
        store.create_dpc(Dpc::new(product.id, details())).await.unwrap();

        assert!(store.delete_product(product.id, TenantScope::All).await.unwrap());
        assert!(store.list_dpcs(TenantScope::All, None).await.unwrap().is_empty());
    }
}
