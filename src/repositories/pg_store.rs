//! Implementación PostgreSQL del `Store`
//!
//! Las operaciones compuestas abren una transacción con `pool.begin()`;
//! cualquier `?` antes del `commit()` descarta la transacción y PostgreSQL
//! hace rollback.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::auth::{ActionClaims, TenantScope, TokenEffect};
use crate::models::{
    Company, CompanyAddress, CompanyPatch, Document, Dpc, Product, ProductPatch, ReviewStatus,
    User, UserPatch,
};
use crate::repositories::store::{Registration, Store};
use crate::utils::errors::{AppError, AppResult};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Traducir la violación de unicidad del email a `DuplicateEmail`
fn map_user_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return AppError::DuplicateEmail;
        }
    }
    AppError::Database(e)
}

const INSERT_COMPANY: &str = r#"
    INSERT INTO companies (id, name, tax_info, status, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING *
"#;

const INSERT_USER: &str = r#"
    INSERT INTO users (id, email, password_hash, role, personal_info, company_id, active, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    RETURNING *
"#;

const INSERT_ADDRESS: &str = r#"
    INSERT INTO company_addresses (id, company_id, address_type, street, city, district, postal_code, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    RETURNING *
"#;

const INSERT_DOCUMENT: &str = r#"
    INSERT INTO documents (id, company_id, document_info, status, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING *
"#;

#[async_trait]
impl Store for PgStore {
    async fn register_company(&self, registration: Registration) -> AppResult<Registration> {
        let Registration {
            company,
            user,
            addresses,
            documents,
        } = registration;

        let mut tx = self.pool.begin().await?;

        let email_taken: bool =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(&user.email)
                .fetch_one(&mut *tx)
                .await?;
        if email_taken {
            return Err(AppError::DuplicateEmail);
        }

        let company = sqlx::query_as::<_, Company>(INSERT_COMPANY)
            .bind(company.id)
            .bind(&company.name)
            .bind(&company.tax_info)
            .bind(company.status)
            .bind(company.created_at)
            .bind(company.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        let user = sqlx::query_as::<_, User>(INSERT_USER)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(&user.personal_info)
            .bind(company.id)
            .bind(user.active)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_user_write_error)?;

        let mut saved_addresses = Vec::with_capacity(addresses.len());
        for address in addresses {
            let saved = sqlx::query_as::<_, CompanyAddress>(INSERT_ADDRESS)
                .bind(address.id)
                .bind(company.id)
                .bind(address.address_type)
                .bind(&address.street)
                .bind(&address.city)
                .bind(&address.district)
                .bind(&address.postal_code)
                .bind(address.created_at)
                .bind(address.updated_at)
                .fetch_one(&mut *tx)
                .await?;
            saved_addresses.push(saved);
        }

        let mut saved_documents = Vec::with_capacity(documents.len());
        for document in documents {
            let saved = sqlx::query_as::<_, Document>(INSERT_DOCUMENT)
                .bind(document.id)
                .bind(company.id)
                .bind(&document.document_info)
                .bind(document.status)
                .bind(document.created_at)
                .bind(document.updated_at)
                .fetch_one(&mut *tx)
                .await?;
            saved_documents.push(saved);
        }

        tx.commit().await?;
        info!("💾 Registro persistido: company={} user={}", company.id, user.id);

        Ok(Registration {
            company,
            user,
            addresses: saved_addresses,
            documents: saved_documents,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid, scope: TenantScope) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
        )
        .bind(id)
        .bind(scope.company_id())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: User) -> AppResult<User> {
        sqlx::query_as::<_, User>(INSERT_USER)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(&user.personal_info)
            .bind(user.company_id)
            .bind(user.active)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_user_write_error)
    }

    async fn list_users(&self, scope: TenantScope) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE ($1::uuid IS NULL OR company_id = $1) ORDER BY created_at DESC",
        )
        .bind(scope.company_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn update_user(&self, id: Uuid, scope: TenantScope, patch: UserPatch) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                personal_info = COALESCE($3, personal_info),
                active = COALESCE($4, active),
                updated_at = NOW()
            WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scope.company_id())
        .bind(patch.personal_info.map(Json))
        .bind(patch.active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid, scope: TenantScope) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)")
            .bind(id)
            .bind(scope.company_id())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn consume_token(&self, claims: &ActionClaims, effect: TokenEffect) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO consumed_tokens (jti, user_id, purpose)
            VALUES ($1, $2, $3)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(claims.jti)
        .bind(claims.sub)
        .bind(claims.purpose.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            debug!("🔁 Token {} ya consumido", claims.jti);
            return Err(AppError::InvalidOrExpiredToken);
        }

        let user = match effect {
            TokenEffect::ActivateUser => {
                sqlx::query_as::<_, User>(
                    "UPDATE users SET active = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
                )
                .bind(claims.sub)
                .fetch_optional(&mut *tx)
                .await?
            }
            TokenEffect::ReplacePassword { password_hash } => {
                sqlx::query_as::<_, User>(
                    "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
                )
                .bind(claims.sub)
                .bind(password_hash)
                .fetch_optional(&mut *tx)
                .await?
            }
        }
        .ok_or(AppError::InvalidOrExpiredToken)?;

        tx.commit().await?;
        Ok(user)
    }

    async fn create_company(&self, company: Company) -> AppResult<Company> {
        let company = sqlx::query_as::<_, Company>(INSERT_COMPANY)
            .bind(company.id)
            .bind(&company.name)
            .bind(&company.tax_info)
            .bind(company.status)
            .bind(company.created_at)
            .bind(company.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(company)
    }

    async fn find_company(&self, id: Uuid, scope: TenantScope) -> AppResult<Option<Company>> {
        if !scope.includes(id) {
            return Ok(None);
        }
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }

    async fn list_companies(&self) -> AppResult<Vec<Company>> {
        let companies = sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(companies)
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
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                name = COALESCE($2, name),
                tax_info = COALESCE($3, tax_info),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name.map(|name| name.trim().to_string()))
        .bind(patch.tax_info.map(Json))
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }

    async fn review_company(&self, id: Uuid, status: ReviewStatus) -> AppResult<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }

    async fn list_addresses(&self, company_id: Uuid) -> AppResult<Vec<CompanyAddress>> {
        let addresses = sqlx::query_as::<_, CompanyAddress>(
            "SELECT * FROM company_addresses WHERE company_id = $1 ORDER BY created_at DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(addresses)
    }

    async fn add_address(&self, address: CompanyAddress) -> AppResult<CompanyAddress> {
        let address = sqlx::query_as::<_, CompanyAddress>(INSERT_ADDRESS)
            .bind(address.id)
            .bind(address.company_id)
            .bind(address.address_type)
            .bind(&address.street)
            .bind(&address.city)
            .bind(&address.district)
            .bind(&address.postal_code)
            .bind(address.created_at)
            .bind(address.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(address)
    }

    async fn list_documents(
        &self,
        company_id: Option<Uuid>,
        status: Option<ReviewStatus>,
    ) -> AppResult<Vec<Document>> {
        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT * FROM documents
            WHERE ($1::uuid IS NULL OR company_id = $1)
            AND ($2::review_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(documents)
    }

    async fn add_document(&self, document: Document) -> AppResult<Document> {
        let document = sqlx::query_as::<_, Document>(INSERT_DOCUMENT)
            .bind(document.id)
            .bind(document.company_id)
            .bind(&document.document_info)
            .bind(document.status)
            .bind(document.created_at)
            .bind(document.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(document)
    }

    async fn find_document(&self, id: Uuid) -> AppResult<Option<Document>> {
        let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(document)
    }

    async fn review_document(&self, id: Uuid, status: ReviewStatus) -> AppResult<Option<Document>> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(document)
    }

    async fn create_product(&self, product: Product) -> AppResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, company_id, name, details, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(product.company_id)
        .bind(&product.name)
        .bind(&product.details)
        .bind(product.active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    async fn list_products(&self, scope: TenantScope) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE ($1::uuid IS NULL OR company_id = $1) ORDER BY created_at DESC",
        )
        .bind(scope.company_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn find_product(&self, id: Uuid, scope: TenantScope) -> AppResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
        )
        .bind(id)
        .bind(scope.company_id())
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        scope: TenantScope,
        patch: ProductPatch,
    ) -> AppResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = COALESCE($3, name),
                details = COALESCE($4, details),
                active = COALESCE($5, active),
                updated_at = NOW()
            WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scope.company_id())
        .bind(patch.name.map(|name| name.trim().to_string()))
        .bind(patch.details.map(Json))
        .bind(patch.active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn delete_product(&self, id: Uuid, scope: TenantScope) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM products WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
        )
        .bind(id)
        .bind(scope.company_id())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_dpc(&self, dpc: Dpc) -> AppResult<Dpc> {
        let dpc = sqlx::query_as::<_, Dpc>(
            r#"
            INSERT INTO dpcs (id, product_id, certification_details, status, blockchain_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(dpc.id)
        .bind(dpc.product_id)
        .bind(&dpc.certification_details)
        .bind(dpc.status)
        .bind(&dpc.blockchain_hash)
        .bind(dpc.created_at)
        .bind(dpc.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(dpc)
    }

    async fn list_dpcs(&self, scope: TenantScope, status: Option<ReviewStatus>) -> AppResult<Vec<Dpc>> {
        let dpcs = sqlx::query_as::<_, Dpc>(
            r#"
            SELECT d.* FROM dpcs d
            INNER JOIN products p ON p.id = d.product_id
            WHERE ($1::uuid IS NULL OR p.company_id = $1)
            AND ($2::review_status IS NULL OR d.status = $2)
            ORDER BY d.created_at DESC
            "#,
        )
        .bind(scope.company_id())
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(dpcs)
    }

    async fn list_dpcs_for_products(&self, product_ids: &[Uuid]) -> AppResult<Vec<Dpc>> {
        let dpcs = sqlx::query_as::<_, Dpc>(
            "SELECT * FROM dpcs WHERE product_id = ANY($1) ORDER BY created_at DESC",
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(dpcs)
    }

    async fn find_dpc(&self, id: Uuid, scope: TenantScope) -> AppResult<Option<Dpc>> {
        let dpc = sqlx::query_as::<_, Dpc>(
            r#"
            SELECT d.* FROM dpcs d
            INNER JOIN products p ON p.id = d.product_id
            WHERE d.id = $1 AND ($2::uuid IS NULL OR p.company_id = $2)
            "#,
        )
        .bind(id)
        .bind(scope.company_id())
        .fetch_optional(&self.pool)
        .await?;
        Ok(dpc)
    }

    async fn review_dpc(
        &self,
        id: Uuid,
        status: ReviewStatus,
        blockchain_hash: Option<String>,
    ) -> AppResult<Option<Dpc>> {
        let dpc = sqlx::query_as::<_, Dpc>(
            r#"
            UPDATE dpcs SET status = $2, blockchain_hash = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(blockchain_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(dpc)
    }
}
