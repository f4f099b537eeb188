use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::DpcController;
use crate::dto::dpc_dto::{CreateDpcRequest, VerificationResponse};
use crate::middleware::{auth_middleware, ValidatedJson};
use crate::models::{AuthContext, Dpc};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn dpc_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_dpcs).post(create_dpc))
        .route("/:id", get(get_dpc))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Verificación pública de un hash anclado, sin autenticación
pub fn verify_routes() -> Router<AppState> {
    Router::new().route("/:hash", get(verify_hash))
}

async fn create_dpc(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    ValidatedJson(request): ValidatedJson<CreateDpcRequest>,
) -> Result<(StatusCode, Json<Dpc>), AppError> {
    let dpc = DpcController::new(&state).create(&context, request).await?;
    Ok((StatusCode::CREATED, Json(dpc)))
}

async fn list_dpcs(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<Vec<Dpc>>, AppError> {
    let dpcs = DpcController::new(&state).list(&context).await?;
    Ok(Json(dpcs))
}

async fn get_dpc(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Dpc>, AppError> {
    let dpc = DpcController::new(&state).get(&context, id).await?;
    Ok(Json(dpc))
}

async fn verify_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<VerificationResponse>, AppError> {
    let result = DpcController::new(&state).verify(&hash).await?;
    Ok(Json(result))
}
