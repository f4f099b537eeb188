use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::dto::user_dto::{CreateUserRequest, UserResponse};
use crate::models::auth::AuthContext;
use crate::models::{User, UserPatch, UserRole};
use crate::repositories::Store;
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, not_found_error, AppResult};
use crate::utils::password::hash_password;
use crate::utils::validation::normalize_email;

pub struct UserController {
    store: Arc<dyn Store>,
    config: Arc<EnvironmentConfig>,
}

impl UserController {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            config: state.config.clone(),
        }
    }

    /// Un `company_admin` da de alta usuarios de su empresa con rol `user`
    pub async fn create(&self, context: &AuthContext, request: CreateUserRequest) -> AppResult<UserResponse> {
        context.require(&[UserRole::CompanyAdmin], "create users")?;

        let user = User::new(
            normalize_email(&request.email),
            hash_password(&request.password, self.config.bcrypt_cost)?,
            UserRole::User,
            context.company_id,
            request.personal_info,
            true,
        );
        let user = self.store.create_user(user).await?;

        info!("👤 Usuario {} creado en la empresa {}", user.id, user.company_id);
        Ok(UserResponse::from(user))
    }

    pub async fn list(&self, context: &AuthContext) -> AppResult<Vec<UserResponse>> {
        context.require(&[UserRole::CompanyAdmin, UserRole::Admin], "list users")?;

        let users = self.store.list_users(context.scope()).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get(&self, context: &AuthContext, id: Uuid) -> AppResult<UserResponse> {
        self.store
            .find_user(id, context.scope())
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| not_found_error("User"))
    }

    pub async fn update(&self, context: &AuthContext, id: Uuid, patch: UserPatch) -> AppResult<UserResponse> {
        context.require(&[UserRole::CompanyAdmin, UserRole::Admin], "update users")?;
        if id == context.user_id && patch.active == Some(false) {
            return Err(forbidden_error("deactivate your own account"));
        }

        self.store
            .update_user(id, context.scope(), patch)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| not_found_error("User"))
    }

    pub async fn delete(&self, context: &AuthContext, id: Uuid) -> AppResult<()> {
        context.require(&[UserRole::CompanyAdmin, UserRole::Admin], "delete users")?;
        // Nadie se borra a sí mismo
        if id == context.user_id {
            return Err(forbidden_error("delete your own account"));
        }

        if !self.store.delete_user(id, context.scope()).await? {
            return Err(not_found_error("User"));
        }
        info!("🗑️ Usuario {} eliminado", id);
        Ok(())
    }
}
