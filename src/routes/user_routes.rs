use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::UserController;
use crate::dto::user_dto::{CreateUserRequest, UserResponse};
use crate::middleware::{auth_middleware, ValidatedJson};
use crate::models::{AuthContext, UserPatch};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn create_user(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = UserController::new(&state).create(&context, request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = UserController::new(&state).list(&context).await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserController::new(&state).get(&context, id).await?;
    Ok(Json(user))
}

async fn update_user(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<UserPatch>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserController::new(&state).update(&context, id, patch).await?;
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    UserController::new(&state).delete(&context, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
