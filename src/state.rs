//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::Store;
use crate::services::jwt_service::JwtService;
use crate::services::ledger_service::LedgerService;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub ledger: LedgerService,
    pub jwt: Arc<JwtService>,
    pub config: Arc<EnvironmentConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, ledger: LedgerService, config: EnvironmentConfig) -> Self {
        Self {
            store,
            ledger,
            jwt: Arc::new(JwtService::from_config(&config)),
            config: Arc::new(config),
        }
    }
}
