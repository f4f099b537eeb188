//! Registro, verificación de email, login y reseteo de contraseña

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::environment::EnvironmentConfig;
use crate::dto::auth_dto::{
    AuthUser, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse,
    MessageResponse, RegisterCompanyRequest, RegisterResponse, ResetPasswordRequest,
};
use crate::dto::company_dto::into_document;
use crate::dto::user_dto::UserResponse;
use crate::models::auth::{AuthContext, TenantScope, TokenEffect, TokenPurpose};
use crate::models::{Company, PersonalInfo, ReviewStatus, TaxInfo, User, UserRole};
use crate::repositories::{Registration, Store};
use crate::services::JwtService;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validation::normalize_email;

const RESET_MESSAGE: &str = "If the email is registered, a password reset link has been issued";

/// Empresa de plataforma a la que pertenece el administrador inicial
const PLATFORM_COMPANY_NAME: &str = "Platform Administration";
const PLATFORM_TAX_NUMBER: &str = "0000000000";

pub struct AuthController {
    store: Arc<dyn Store>,
    jwt: Arc<JwtService>,
    config: Arc<EnvironmentConfig>,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            jwt: state.jwt.clone(),
            config: state.config.clone(),
        }
    }

    /// Registro atómico de empresa + persona autorizada + direcciones + documentos
    pub async fn register(&self, request: RegisterCompanyRequest) -> AppResult<RegisterResponse> {
        let email = normalize_email(&request.authorized_person.email);
        let password_hash = hash_password(&request.password, self.config.bcrypt_cost)?;

        let company = Company::new(request.company_name, request.tax_info);
        let person = request.authorized_person;
        let user = User::new(
            email,
            password_hash,
            UserRole::CompanyAdmin,
            company.id,
            Some(PersonalInfo {
                first_name: person.first_name.trim().to_string(),
                last_name: person.last_name.trim().to_string(),
                phone: person.phone,
                title: person.title,
            }),
            !self.config.require_email_verification,
        );

        // El token se firma antes de escribir nada: si falla, no queda registro a medias
        let verification_token = self.jwt.issue_action_token(
            user.id,
            TokenPurpose::EmailVerification,
            self.config.verification_token_expiration,
        )?;

        let registration = Registration {
            addresses: request
                .addresses
                .into_iter()
                .map(|a| a.into_address(company.id))
                .collect(),
            documents: request
                .documents
                .into_iter()
                .map(|d| into_document(d, company.id))
                .collect(),
            company,
            user,
        };

        let saved = self.store.register_company(registration).await?;
        info!(
            "🏢 Empresa registrada: {} ({}) con {} direcciones y {} documentos",
            saved.company.name,
            saved.company.id,
            saved.addresses.len(),
            saved.documents.len()
        );

        Ok(RegisterResponse {
            user_id: saved.user.id,
            company_id: saved.company.id,
            verification_url: self.config.verification_url(&verification_token),
            verification_token,
        })
    }

    /// Activa al usuario del token. El token queda consumido.
    pub async fn verify_email(&self, token: &str) -> AppResult<MessageResponse> {
        let claims = self
            .jwt
            .decode_action_token(token, TokenPurpose::EmailVerification)?;
        let user = self
            .store
            .consume_token(&claims, TokenEffect::ActivateUser)
            .await?;

        info!("✅ Email verificado para el usuario {}", user.id);
        Ok(MessageResponse::new("Email verified successfully"))
    }

    /// Orden de comprobación: credenciales, email verificado, empresa aprobada
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let email = normalize_email(&request.email);
        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            warn!("🔒 Contraseña incorrecta para {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        if !user.active {
            return Err(AppError::EmailNotVerified);
        }

        let company = self
            .store
            .find_company(user.company_id, TenantScope::All)
            .await?
            .ok_or_else(|| AppError::Internal(format!("user {} has no company", user.id)))?;
        if !company.approved() {
            return Err(AppError::CompanyNotApproved);
        }

        let token = self.jwt.issue_access_token(&user)?;
        info!("🔑 Login correcto: {} ({})", user.id, user.role);

        Ok(LoginResponse {
            token,
            user: AuthUser::from(&user),
        })
    }

    /// Misma respuesta exista o no el email; el token solo se emite si existe
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> AppResult<ForgotPasswordResponse> {
        let email = normalize_email(&request.email);
        let reset_token = match self.store.find_user_by_email(&email).await? {
            Some(user) => Some(self.jwt.issue_action_token(
                user.id,
                TokenPurpose::PasswordReset,
                self.config.reset_token_expiration,
            )?),
            None => None,
        };

        Ok(ForgotPasswordResponse {
            message: RESET_MESSAGE.to_string(),
            reset_token,
        })
    }

    pub async fn reset_password(&self, request: ResetPasswordRequest) -> AppResult<MessageResponse> {
        let claims = self
            .jwt
            .decode_action_token(&request.token, TokenPurpose::PasswordReset)?;
        let password_hash = hash_password(&request.password, self.config.bcrypt_cost)?;

        let user = self
            .store
            .consume_token(&claims, TokenEffect::ReplacePassword { password_hash })
            .await?;

        info!("🔑 Contraseña restablecida para el usuario {}", user.id);
        Ok(MessageResponse::new("Password has been reset"))
    }

    pub async fn me(&self, context: &AuthContext) -> AppResult<UserResponse> {
        let user = self
            .store
            .find_user(context.user_id, TenantScope::All)
            .await?
            .ok_or_else(|| not_found_error("User"))?;
        Ok(UserResponse::from(user))
    }

    /// Crea el administrador de plataforma si está configurado y no existe.
    /// Usa el mismo camino atómico que el registro.
    pub async fn bootstrap_admin(&self) -> AppResult<Option<User>> {
        let (email, password) = match (&self.config.admin_email, &self.config.admin_password) {
            (Some(email), Some(password)) => (normalize_email(email), password),
            _ => return Ok(None),
        };

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Ok(None);
        }

        let mut company = Company::new(
            PLATFORM_COMPANY_NAME.to_string(),
            TaxInfo {
                tax_number: PLATFORM_TAX_NUMBER.to_string(),
                tax_office: None,
                trade_registry_no: None,
                mersis_no: None,
            },
        );
        company.status = ReviewStatus::Approved;

        let user = User::new(
            email,
            hash_password(password, self.config.bcrypt_cost)?,
            UserRole::Admin,
            company.id,
            None,
            true,
        );

        let saved = self
            .store
            .register_company(Registration {
                company,
                user,
                addresses: vec![],
                documents: vec![],
            })
            .await?;

        info!("👑 Administrador de plataforma creado: {}", saved.user.email);
        Ok(Some(saved.user))
    }
}
