//! Middleware de autenticación JWT
//!
//! Extrae el token `Bearer`, lo valida y comprueba que el usuario sigue
//! existiendo y activo. El `AuthContext` resultante se inyecta en las
//! extensions de la request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension,
};
use tracing::debug;

use crate::models::auth::{AuthContext, TenantScope};
use crate::models::UserRole;
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, AppError};

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthenticated("Authorization token required".to_string()))?;

    let claims = state.jwt.validate_access_token(token)?;

    // Un usuario borrado o desactivado pierde el acceso aunque su token siga vigente
    let user = state
        .store
        .find_user(claims.sub, TenantScope::All)
        .await?
        .filter(|user| user.active)
        .ok_or_else(|| AppError::Unauthenticated("User not found or inactive".to_string()))?;

    let context = AuthContext {
        user_id: user.id,
        role: user.role,
        company_id: user.company_id,
    };
    debug!("🔐 {} autenticado como {}", context.user_id, context.role);

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// Middleware para las rutas de administración de plataforma
pub async fn admin_only_middleware(
    Extension(context): Extension<AuthContext>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if context.role != UserRole::Admin {
        return Err(forbidden_error("access administration"));
    }

    Ok(next.run(request).await)
}
