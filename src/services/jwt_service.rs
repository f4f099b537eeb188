use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::models::auth::{AccessClaims, ActionClaims, TokenPurpose};
use crate::models::User;
use crate::utils::errors::AppError;

/// Servicio JWT: tokens de acceso y tokens de acción de un solo uso
pub struct JwtService {
    algorithm: Algorithm,
    access_token_duration: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str, access_token_seconds: u64) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            access_token_duration: Duration::seconds(access_token_seconds as i64),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self::new(&config.jwt_secret, config.jwt_expiration)
    }

    /// Genera un token de acceso para el usuario
    pub fn issue_access_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user.id,
            role: user.role,
            company_id: user.company_id,
            exp: (now + self.access_token_duration).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Error generating access token: {}", e)))
    }

    /// Valida y decodifica un token de acceso
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        decode::<AccessClaims>(token, &self.decoding_key, &Validation::new(self.algorithm))
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("🔒 Token de acceso rechazado: {}", e);
                AppError::Unauthenticated("Invalid or expired token".to_string())
            })
    }

    /// Genera un token de acción con `jti` propio
    pub fn issue_action_token(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        ttl_seconds: u64,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = ActionClaims {
            sub: user_id,
            purpose,
            jti: Uuid::new_v4(),
            exp: (now + Duration::seconds(ttl_seconds as i64)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Error generating {} token: {}", purpose.as_str(), e)))
    }

    /// Decodifica un token de acción y comprueba su propósito.
    /// No marca el token como consumido; eso lo hace el `Store`.
    pub fn decode_action_token(&self, token: &str, purpose: TokenPurpose) -> Result<ActionClaims, AppError> {
        let claims = decode::<ActionClaims>(token, &self.decoding_key, &Validation::new(self.algorithm))
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("🔒 Token de acción rechazado: {}", e);
                AppError::InvalidOrExpiredToken
            })?;

        if claims.purpose != purpose {
            return Err(AppError::InvalidOrExpiredToken);
        }
        Ok(claims)
    }
}
