use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::AuthController;
use crate::dto::auth_dto::{
    ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse, MessageResponse,
    RegisterCompanyRequest, RegisterResponse, ResetPasswordRequest, VerifyEmailRequest,
};
use crate::dto::user_dto::UserResponse;
use crate::middleware::{auth_middleware, ValidatedJson};
use crate::models::AuthContext;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Configura las rutas de autenticación
pub fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-email", post(verify_email).get(verify_email_link))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .merge(protected)
}

async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterCompanyRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let response = AuthController::new(&state).register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthController::new(&state).login(request).await?;
    Ok(Json(response))
}

async fn verify_email(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = AuthController::new(&state).verify_email(&request.token).await?;
    Ok(Json(response))
}

/// Variante GET para el enlace enviado al usuario
async fn verify_email_link(
    State(state): State<AppState>,
    Query(request): Query<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = AuthController::new(&state).verify_email(&request.token).await?;
    Ok(Json(response))
}

async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, AppError> {
    let response = AuthController::new(&state).forgot_password(request).await?;
    Ok(Json(response))
}

async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = AuthController::new(&state).reset_password(request).await?;
    Ok(Json(response))
}

async fn me(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<UserResponse>, AppError> {
    let response = AuthController::new(&state).me(&context).await?;
    Ok(Json(response))
}
