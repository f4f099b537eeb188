use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::dto::product_dto::{CreateProductRequest, ProductWithDpcs};
use crate::models::auth::AuthContext;
use crate::models::{Dpc, Product, ProductPatch, UserRole};
use crate::repositories::Store;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};

pub struct ProductController {
    store: Arc<dyn Store>,
}

impl ProductController {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    pub async fn create(&self, context: &AuthContext, request: CreateProductRequest) -> AppResult<Product> {
        context.require(&[UserRole::CompanyAdmin, UserRole::User], "create products")?;

        let product = self
            .store
            .create_product(Product::new(context.company_id, request.name, request.details))
            .await?;
        info!("📦 Producto {} creado en la empresa {}", product.id, product.company_id);
        Ok(product)
    }

    /// Productos visibles, cada uno con sus DPCs
    pub async fn list(&self, context: &AuthContext) -> AppResult<Vec<ProductWithDpcs>> {
        let products = self.store.list_products(context.scope()).await?;
        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();

        let mut by_product: HashMap<Uuid, Vec<Dpc>> = HashMap::new();
        for dpc in self.store.list_dpcs_for_products(&ids).await? {
            by_product.entry(dpc.product_id).or_default().push(dpc);
        }

        Ok(products
            .into_iter()
            .map(|product| ProductWithDpcs {
                dpcs: by_product.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect())
    }

    pub async fn get(&self, context: &AuthContext, id: Uuid) -> AppResult<ProductWithDpcs> {
        let product = self
            .store
            .find_product(id, context.scope())
            .await?
            .ok_or_else(|| not_found_error("Product"))?;
        let dpcs = self.store.list_dpcs_for_products(&[product.id]).await?;
        Ok(ProductWithDpcs { product, dpcs })
    }

    pub async fn update(&self, context: &AuthContext, id: Uuid, patch: ProductPatch) -> AppResult<Product> {
        context.require(&[UserRole::CompanyAdmin, UserRole::User], "update products")?;

        self.store
            .update_product(id, context.scope(), patch)
            .await?
            .ok_or_else(|| not_found_error("Product"))
    }

    /// Borrado físico; los DPCs del producto se borran con él
    pub async fn delete(&self, context: &AuthContext, id: Uuid) -> AppResult<()> {
        context.require(&[UserRole::CompanyAdmin], "delete products")?;

        if !self.store.delete_product(id, context.scope()).await? {
            return Err(not_found_error("Product"));
        }
        info!("🗑️ Producto {} eliminado", id);
        Ok(())
    }
}
