//! Configuración de base de datos
//!
//! Este módulo maneja la conexión y configuración de PostgreSQL con SQLx.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::env;
use std::time::Duration;

/// Configuración de la base de datos
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            max_connections: 20,
            min_connections: 5,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(3600),
            run_migrations: true,
        }
    }

    /// Leer `DATABASE_URL` o componerla con `DB_HOST`/`DB_PORT`/`DB_USERNAME`/`DB_PASSWORD`/`DB_NAME`.
    /// Devuelve `None` si no hay ninguna base de datos configurada.
    pub fn from_env() -> Option<Self> {
        let url = env::var("DATABASE_URL").ok().or_else(|| {
            let host = env::var("DB_HOST").ok()?;
            let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
            let username = env::var("DB_USERNAME").unwrap_or_else(|_| "postgres".to_string());
            let password = env::var("DB_PASSWORD").unwrap_or_else(|_| "postgres".to_string());
            let database = env::var("DB_NAME").unwrap_or_else(|_| "usesafe".to_string());
            Some(format!(
                "postgres://{}:{}@{}:{}/{}",
                username, password, host, port, database
            ))
        })?;

        let mut config = Self::new(url);
        if let Ok(max) = env::var("DB_MAX_CONNECTIONS") {
            if let Ok(max) = max.parse() {
                config.max_connections = max;
                config.min_connections = config.min_connections.min(max);
            }
        }
        config.run_migrations = env::var("RUN_MIGRATIONS")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        Some(config)
    }

    /// Crear un nuevo pool de conexiones
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .connect(&self.url)
            .await
    }
}
