use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use dpc_registry::config::{DatabaseConfig, EnvironmentConfig};
use dpc_registry::controllers::AuthController;
use dpc_registry::database::DatabaseConnection;
use dpc_registry::repositories::{MemoryStore, PgStore, Store};
use dpc_registry::services::LedgerService;
use dpc_registry::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    let level = tracing::Level::from_str(&config.log_level).unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("📜 DPC Registry - backend de certificación");
    info!("================================================");
    info!("🌍 Entorno: {}", config.environment);

    // Inicializar almacenamiento
    let store: Arc<dyn Store> = match DatabaseConfig::from_env() {
        Some(db_config) => {
            let connection = DatabaseConnection::new(&db_config).await?;
            Arc::new(PgStore::new(connection.pool().clone()))
        }
        None if config.is_production() => {
            anyhow::bail!("DATABASE_URL o DB_HOST son obligatorios en producción");
        }
        None => {
            warn!("⚠️ Sin DATABASE_URL ni DB_HOST: usando almacenamiento en memoria (solo desarrollo)");
            Arc::new(MemoryStore::new())
        }
    };

    // Inicializar ledger; si no conecta, el servicio arranca igual
    let ledger = LedgerService::from_config(&config.blockchain)
        .map_err(|e| anyhow::anyhow!("Error configurando el ledger: {}", e))?;
    if let Err(e) = ledger.connect().await {
        warn!("⚠️ Ledger no disponible al arrancar: {}", e);
    }

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("Dirección inválida: {}", config.server_url()))?;

    let state = AppState::new(store, ledger, config);

    if let Err(e) = AuthController::new(&state).bootstrap_admin().await {
        error!("❌ Error creando el administrador inicial: {}", e);
        return Err(anyhow::anyhow!("Error creando el administrador inicial: {}", e));
    }

    let app = create_router(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   POST /api/auth/register | login | verify-email | forgot-password | reset-password");
    info!("   GET  /api/auth/me");
    info!("   CRUD /api/users | /api/companies | /api/products | /api/dpcs");
    info!("   PUT  /api/admin/{{companies|documents|dpcs}}/:id/status");
    info!("   GET  /api/verify/:hash");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
