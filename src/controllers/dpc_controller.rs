use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::dto::dpc_dto::{CreateDpcRequest, VerificationResponse};
use crate::models::auth::{AuthContext, TenantScope};
use crate::models::{Dpc, UserRole};
use crate::repositories::Store;
use crate::services::LedgerService;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};

pub struct DpcController {
    store: Arc<dyn Store>,
    ledger: LedgerService,
}

impl DpcController {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            ledger: state.ledger.clone(),
        }
    }

    /// El producto tiene que ser de la empresa del llamante
    pub async fn create(&self, context: &AuthContext, request: CreateDpcRequest) -> AppResult<Dpc> {
        context.require(&[UserRole::CompanyAdmin, UserRole::User], "create DPCs")?;

        let product = self
            .store
            .find_product(request.product_id, TenantScope::Company(context.company_id))
            .await?
            .ok_or_else(|| not_found_error("Product"))?;

        let dpc = self
            .store
            .create_dpc(Dpc::new(product.id, request.certification_details))
            .await?;
        info!("📜 DPC {} solicitado para el producto {}", dpc.id, product.id);
        Ok(dpc)
    }

    pub async fn list(&self, context: &AuthContext) -> AppResult<Vec<Dpc>> {
        self.store.list_dpcs(context.scope(), None).await
    }

    pub async fn get(&self, context: &AuthContext, id: Uuid) -> AppResult<Dpc> {
        self.store
            .find_dpc(id, context.scope())
            .await?
            .ok_or_else(|| not_found_error("DPC"))
    }

    /// Consulta pública al ledger
    pub async fn verify(&self, hash: &str) -> AppResult<VerificationResponse> {
        let valid = self.ledger.verify(hash).await?;
        Ok(VerificationResponse {
            hash: hash.to_string(),
            valid,
        })
    }
}
