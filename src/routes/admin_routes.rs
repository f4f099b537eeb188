use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::AdminController;
use crate::dto::admin_dto::StatusUpdateRequest;
use crate::dto::company_dto::{CompanyDetailResponse, CompanyResponse, DocumentWithCompany};
use crate::dto::dpc_dto::DpcWithProduct;
use crate::middleware::{admin_only_middleware, auth_middleware, ValidatedJson};
use crate::models::{Document, Dpc};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas de revisión; todas exigen rol `admin`
pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies))
        .route("/companies/:id/status", put(review_company))
        .route("/documents", get(list_documents))
        .route("/documents/:id/status", put(review_document))
        .route("/dpcs", get(list_dpcs))
        .route("/dpcs/:id/status", put(review_dpc))
        .route_layer(middleware::from_fn(admin_only_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn list_companies(State(state): State<AppState>) -> Result<Json<Vec<CompanyDetailResponse>>, AppError> {
    let companies = AdminController::new(&state).list_companies().await?;
    Ok(Json(companies))
}

async fn review_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<StatusUpdateRequest>,
) -> Result<Json<CompanyResponse>, AppError> {
    let company = AdminController::new(&state).review_company(id, request).await?;
    Ok(Json(company))
}

async fn list_documents(State(state): State<AppState>) -> Result<Json<Vec<DocumentWithCompany>>, AppError> {
    let documents = AdminController::new(&state).list_pending_documents().await?;
    Ok(Json(documents))
}

async fn review_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<StatusUpdateRequest>,
) -> Result<Json<Document>, AppError> {
    let document = AdminController::new(&state).review_document(id, request).await?;
    Ok(Json(document))
}

async fn list_dpcs(State(state): State<AppState>) -> Result<Json<Vec<DpcWithProduct>>, AppError> {
    let dpcs = AdminController::new(&state).list_pending_dpcs().await?;
    Ok(Json(dpcs))
}

async fn review_dpc(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<StatusUpdateRequest>,
) -> Result<Json<Dpc>, AppError> {
    let dpc = AdminController::new(&state).review_dpc(id, request).await?;
    Ok(Json(dpc))
}
