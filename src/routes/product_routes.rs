use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::ProductController;
use crate::dto::product_dto::{CreateProductRequest, ProductWithDpcs};
use crate::middleware::{auth_middleware, ValidatedJson};
use crate::models::{AuthContext, Product, ProductPatch};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn product_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).put(update_product).delete(delete_product))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn create_product(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    ValidatedJson(request): ValidatedJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = ProductController::new(&state).create(&context, request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn list_products(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<Vec<ProductWithDpcs>>, AppError> {
    let products = ProductController::new(&state).list(&context).await?;
    Ok(Json(products))
}

async fn get_product(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductWithDpcs>, AppError> {
    let product = ProductController::new(&state).get(&context, id).await?;
    Ok(Json(product))
}

async fn update_product(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<ProductPatch>,
) -> Result<Json<Product>, AppError> {
    let product = ProductController::new(&state).update(&context, id, patch).await?;
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ProductController::new(&state).delete(&context, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
