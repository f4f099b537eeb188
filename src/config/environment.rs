//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

const DEV_JWT_SECRET: &str = "dev-only-secret-change-me";

/// Identificadores de la red de ledger donde se anclan los certificados
#[derive(Debug, Clone)]
pub struct BlockchainConfig {
    pub network_name: String,
    pub channel_name: String,
    pub chaincode_name: String,
    /// URL del gateway REST; `None` usa el ledger en proceso
    pub gateway_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            network_name: "usesafe-network".to_string(),
            channel_name: "certification-channel".to_string(),
            chaincode_name: "certification-contract".to_string(),
            gateway_url: None,
            timeout_secs: 10,
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    /// Validez del token de acceso en segundos
    pub jwt_expiration: u64,
    pub verification_token_expiration: u64,
    pub reset_token_expiration: u64,
    /// `true`: los usuarios nuevos quedan inactivos hasta verificar el email
    pub require_email_verification: bool,
    pub bcrypt_cost: u32,
    pub frontend_url: String,
    pub cors_origins: Vec<String>,
    pub blockchain: BlockchainConfig,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub log_level: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiration: 24 * 60 * 60,
            verification_token_expiration: 24 * 60 * 60,
            reset_token_expiration: 60 * 60,
            require_email_verification: true,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            frontend_url: "http://localhost:3000".to_string(),
            cors_origins: Vec::new(),
            blockchain: BlockchainConfig::default(),
            admin_email: None,
            admin_password: None,
            log_level: "debug".to_string(),
        }
    }
}

impl EnvironmentConfig {
    /// Cargar configuración desde variables de entorno, con valores por defecto de desarrollo
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);
        let is_production = environment == "production";

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if is_production => bail!("JWT_SECRET must be set in production"),
            _ => defaults.jwt_secret,
        };

        let blockchain = BlockchainConfig {
            network_name: env::var("BLOCKCHAIN_NETWORK")
                .unwrap_or(defaults.blockchain.network_name),
            channel_name: env::var("BLOCKCHAIN_CHANNEL")
                .unwrap_or(defaults.blockchain.channel_name),
            chaincode_name: env::var("BLOCKCHAIN_CHAINCODE")
                .unwrap_or(defaults.blockchain.chaincode_name),
            gateway_url: env::var("BLOCKCHAIN_GATEWAY_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            timeout_secs: parse_var("BLOCKCHAIN_TIMEOUT_SECS", defaults.blockchain.timeout_secs)?,
        };

        Ok(Self {
            port: parse_var("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            jwt_secret,
            jwt_expiration: parse_var("JWT_EXPIRATION", defaults.jwt_expiration)?,
            verification_token_expiration: parse_var(
                "VERIFICATION_TOKEN_EXPIRATION",
                defaults.verification_token_expiration,
            )?,
            reset_token_expiration: parse_var("RESET_TOKEN_EXPIRATION", defaults.reset_token_expiration)?,
            require_email_verification: parse_var(
                "REQUIRE_EMAIL_VERIFICATION",
                defaults.require_email_verification,
            )?,
            bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost)?,
            frontend_url: env::var("FRONTEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.frontend_url),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            blockchain,
            admin_email: env::var("ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| {
                if is_production { "info".to_string() } else { defaults.log_level }
            }),
            environment,
        })
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Enlace público de verificación de email
    pub fn verification_url(&self, token: &str) -> String {
        format!("{}/verify-email?token={}", self.frontend_url, urlencoding::encode(token))
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid value, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_url_is_encoded() {
        let config = EnvironmentConfig {
            frontend_url: "https://app.example.com".to_string(),
            ..EnvironmentConfig::default()
        };
        assert_eq!(
            config.verification_url("a.b+c"),
            "https://app.example.com/verify-email?token=a.b%2Bc"
        );
    }

    #[test]
    fn test_defaults() {
        let config = EnvironmentConfig::default();
        assert_eq!(config.jwt_expiration, 86_400);
        assert!(config.require_email_verification);
        assert!(!config.is_production());
        assert_eq!(config.server_url(), "0.0.0.0:3000");
    }
}
