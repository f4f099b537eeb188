use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::CompanyController;
use crate::dto::company_dto::{CompanyResponse, CreateCompanyRequest, NewAddressRequest, NewDocumentRequest};
use crate::middleware::{auth_middleware, ValidatedJson};
use crate::models::{AuthContext, CompanyAddress, CompanyPatch, Document};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn company_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route("/:id", get(get_company).put(update_company))
        .route("/:id/documents", get(list_documents).post(add_document))
        .route("/:id/addresses", get(list_addresses).post(add_address))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn create_company(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    ValidatedJson(request): ValidatedJson<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyResponse>), AppError> {
    let company = CompanyController::new(&state).create(&context, request).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

async fn list_companies(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<Vec<CompanyResponse>>, AppError> {
    let companies = CompanyController::new(&state).list(&context).await?;
    Ok(Json(companies))
}

async fn get_company(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompanyResponse>, AppError> {
    let company = CompanyController::new(&state).get(&context, id).await?;
    Ok(Json(company))
}

async fn update_company(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<CompanyPatch>,
) -> Result<Json<CompanyResponse>, AppError> {
    let company = CompanyController::new(&state).update(&context, id, patch).await?;
    Ok(Json(company))
}

async fn list_documents(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Document>>, AppError> {
    let documents = CompanyController::new(&state).list_documents(&context, id).await?;
    Ok(Json(documents))
}

async fn add_document(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<NewDocumentRequest>,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let document = CompanyController::new(&state).add_document(&context, id, request).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

async fn list_addresses(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CompanyAddress>>, AppError> {
    let addresses = CompanyController::new(&state).list_addresses(&context, id).await?;
    Ok(Json(addresses))
}

async fn add_address(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<NewAddressRequest>,
) -> Result<(StatusCode, Json<CompanyAddress>), AppError> {
    let address = CompanyController::new(&state).add_address(&context, id, request).await?;
    Ok((StatusCode::CREATED, Json(address)))
}
