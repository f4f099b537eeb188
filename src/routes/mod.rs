//! Router HTTP
//!
//! Cada recurso tiene su módulo de rutas; aquí se montan bajo `/api`
//! junto con el health check, CORS y el trazado de requests.

pub mod admin_routes;
pub mod auth_routes;
pub mod company_routes;
pub mod dpc_routes;
pub mod product_routes;
pub mod user_routes;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_layer;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes::auth_routes(state.clone()))
        .nest("/api/users", user_routes::user_routes(state.clone()))
        .nest("/api/companies", company_routes::company_routes(state.clone()))
        .nest("/api/products", product_routes::product_routes(state.clone()))
        .nest("/api/dpcs", dpc_routes::dpc_routes(state.clone()))
        .nest("/api/verify", dpc_routes::verify_routes())
        .nest("/api/admin", admin_routes::admin_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_origins)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "environment": state.config.environment,
        "ledgerConnected": state.ledger.is_connected(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
