//! Servicio de anclaje en el ledger
//!
//! `LedgerGateway` es el puerto hacia la red de certificación. Hay dos
//! implementaciones: `HttpLedgerGateway`, que habla con un gateway REST
//! delante de la red, y `LocalLedger`, que calcula el hash en proceso y
//! sirve para desarrollo y tests. `LedgerService` envuelve cualquiera de
//! las dos con timeout, conexión perezosa y traducción a `AppError`.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::config::environment::BlockchainConfig;
use crate::models::CertificationRecord;
use crate::utils::errors::AppError;

/// Fallos del ledger
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// La red no responde o no es alcanzable
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// La red respondió pero rechazó el registro
    #[error("ledger rejected the record: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn connect(&self) -> Result<(), LedgerError>;
    fn is_connected(&self) -> bool;
    /// Registra el hecho y devuelve su hash de anclaje
    async fn record_certification(&self, record: &CertificationRecord) -> Result<String, LedgerError>;
    async fn verify_certification(&self, hash: &str) -> Result<bool, LedgerError>;
}

/// Hash sha256 en hex de la serialización canónica del registro.
/// `serde_json::Map` ordena las claves, así que la salida es estable.
pub fn certification_hash(record: &CertificationRecord) -> Result<String, LedgerError> {
    let value = serde_json::to_value(record)
        .map_err(|e| LedgerError::Rejected(format!("record not serializable: {}", e)))?;
    let canonical = serde_json::to_string(&value)
        .map_err(|e| LedgerError::Rejected(format!("record not serializable: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// Ledger en proceso
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct LocalLedger {
    anchored: RwLock<HashSet<String>>,
    connected: AtomicBool,
}

impl LocalLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerGateway for LocalLedger {
    async fn connect(&self) -> Result<(), LedgerError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn record_certification(&self, record: &CertificationRecord) -> Result<String, LedgerError> {
        let hash = certification_hash(record)?;
        self.anchored.write().await.insert(hash.clone());
        Ok(hash)
    }

    async fn verify_certification(&self, hash: &str) -> Result<bool, LedgerError> {
        Ok(self.anchored.read().await.contains(hash))
    }
}

// ---------------------------------------------------------------------------
// Gateway REST
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordRequest<'a> {
    network: &'a str,
    record: &'a CertificationRecord,
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    hash: String,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    valid: bool,
}

pub struct HttpLedgerGateway {
    client: reqwest::Client,
    base_url: String,
    config: BlockchainConfig,
    connected: AtomicBool,
}

impl HttpLedgerGateway {
    pub fn new(base_url: &str, config: BlockchainConfig) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LedgerError::Unavailable(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
            connected: AtomicBool::new(false),
        })
    }

    fn certifications_url(&self) -> String {
        format!(
            "{}/channels/{}/chaincodes/{}/certifications",
            self.base_url,
            urlencoding::encode(&self.config.channel_name),
            urlencoding::encode(&self.config.chaincode_name)
        )
    }

    fn transport_error(&self, e: reqwest::Error) -> LedgerError {
        self.connected.store(false, Ordering::SeqCst);
        LedgerError::Unavailable(e.to_string())
    }
}

/// 5xx = red caída; 4xx = registro rechazado
fn status_error(status: reqwest::StatusCode, body: String) -> LedgerError {
    if status.is_server_error() {
        LedgerError::Unavailable(format!("gateway returned {}: {}", status, body))
    } else {
        LedgerError::Rejected(format!("gateway returned {}: {}", status, body))
    }
}

#[async_trait]
impl LedgerGateway for HttpLedgerGateway {
    async fn connect(&self) -> Result<(), LedgerError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(LedgerError::Unavailable(format!(
                "gateway health returned {}",
                response.status()
            )));
        }

        self.connected.store(true, Ordering::SeqCst);
        info!(
            "⛓️ Conectado al ledger {} (canal {}, contrato {})",
            self.config.network_name, self.config.channel_name, self.config.chaincode_name
        );
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn record_certification(&self, record: &CertificationRecord) -> Result<String, LedgerError> {
        let response = self
            .client
            .post(self.certifications_url())
            .json(&RecordRequest {
                network: &self.config.network_name,
                record,
            })
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let parsed: RecordResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Rejected(format!("unexpected gateway response: {}", e)))?;
        Ok(parsed.hash)
    }

    async fn verify_certification(&self, hash: &str) -> Result<bool, LedgerError> {
        let url = format!("{}/{}", self.certifications_url(), urlencoding::encode(hash));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let parsed: VerifyResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Rejected(format!("unexpected gateway response: {}", e)))?;
        Ok(parsed.valid)
    }
}

// ---------------------------------------------------------------------------
// Servicio
// ---------------------------------------------------------------------------

/// Punto de entrada del resto de la aplicación al ledger
#[derive(Clone)]
pub struct LedgerService {
    gateway: Arc<dyn LedgerGateway>,
    timeout: Duration,
}

impl LedgerService {
    pub fn new(gateway: Arc<dyn LedgerGateway>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    /// Gateway REST si hay URL configurada; si no, ledger en proceso
    pub fn from_config(config: &BlockchainConfig) -> Result<Self, LedgerError> {
        let gateway: Arc<dyn LedgerGateway> = match &config.gateway_url {
            Some(url) => Arc::new(HttpLedgerGateway::new(url, config.clone())?),
            None => {
                warn!("⚠️ BLOCKCHAIN_GATEWAY_URL no definido, usando ledger local");
                Arc::new(LocalLedger::new())
            }
        };
        Ok(Self::new(gateway, Duration::from_secs(config.timeout_secs)))
    }

    pub fn is_connected(&self) -> bool {
        self.gateway.is_connected()
    }

    pub async fn connect(&self) -> Result<(), AppError> {
        match tokio::time::timeout(self.timeout, self.gateway.connect()).await {
            Ok(result) => result.map_err(to_app_error),
            Err(_) => Err(AppError::LedgerUnavailable("connection timed out".to_string())),
        }
    }

    async fn ensure_connected(&self) -> Result<(), AppError> {
        if self.gateway.is_connected() {
            return Ok(());
        }
        self.connect().await
    }

    /// Ancla el registro y devuelve el hash. No reintenta.
    pub async fn anchor(&self, record: &CertificationRecord) -> Result<String, AppError> {
        self.ensure_connected().await?;

        let result = tokio::time::timeout(self.timeout, self.gateway.record_certification(record)).await;
        match result {
            Ok(Ok(hash)) => {
                info!("⛓️ DPC {} anclado con hash {}", record.dpc_id, hash);
                Ok(hash)
            }
            Ok(Err(e)) => {
                error!("❌ Error anclando DPC {}: {}", record.dpc_id, e);
                Err(to_app_error(e))
            }
            Err(_) => {
                error!("❌ Timeout anclando DPC {}", record.dpc_id);
                Err(AppError::LedgerUnavailable("anchoring timed out".to_string()))
            }
        }
    }

    pub async fn verify(&self, hash: &str) -> Result<bool, AppError> {
        self.ensure_connected().await?;

        match tokio::time::timeout(self.timeout, self.gateway.verify_certification(hash)).await {
            Ok(result) => result.map_err(to_app_error),
            Err(_) => Err(AppError::LedgerUnavailable("verification timed out".to_string())),
        }
    }
}

fn to_app_error(e: LedgerError) -> AppError {
    match e {
        LedgerError::Unavailable(msg) => AppError::LedgerUnavailable(msg),
        LedgerError::Rejected(msg) => AppError::AnchoringRejected(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CertificationDetails, Dpc};
    use chrono::{TimeZone, Utc};
    use serde_json::Map;
    use uuid::Uuid;

    fn record() -> CertificationRecord {
        let dpc = Dpc::new(
            Uuid::new_v4(),
            CertificationDetails {
                standard: "CE".to_string(),
                certifier: Some("TÜV".to_string()),
                valid_until: None,
                attributes: Map::new(),
            },
        );
        CertificationRecord::from_dpc(&dpc, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
    }

    struct SlowLedger;

    #[async_trait]
    impl LedgerGateway for SlowLedger {
        async fn connect(&self) -> Result<(), LedgerError> {
            Ok(())
        }
        fn is_connected(&self) -> bool {
            true
        }
        async fn record_certification(&self, _: &CertificationRecord) -> Result<String, LedgerError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }
        async fn verify_certification(&self, _: &str) -> Result<bool, LedgerError> {
            Ok(false)
        }
    }

    struct RejectingLedger;

    #[async_trait]
    impl LedgerGateway for RejectingLedger {
        async fn connect(&self) -> Result<(), LedgerError> {
            Ok(())
        }
        fn is_connected(&self) -> bool {
            true
        }
        async fn record_certification(&self, _: &CertificationRecord) -> Result<String, LedgerError> {
            Err(LedgerError::Rejected("endorsement failed".to_string()))
        }
        async fn verify_certification(&self, _: &str) -> Result<bool, LedgerError> {
            Ok(false)
        }
    }

    #[test]
    fn test_hash_is_deterministic_sha256_hex() {
        let record = record();
        let a = certification_hash(&record).unwrap();
        let b = certification_hash(&record).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_local_ledger_verifies_anchored_hashes() {
        let service = LedgerService::new(Arc::new(LocalLedger::new()), Duration::from_secs(1));
        assert!(!service.is_connected());

        let hash = service.anchor(&record()).await.unwrap();
        assert!(service.is_connected());
        assert!(service.verify(&hash).await.unwrap());
        assert!(!service.verify("deadbeef").await.unwrap());
    }

    #[tokio::test]
    async fn test_timeout_maps_to_unavailable() {
        let service = LedgerService::new(Arc::new(SlowLedger), Duration::from_millis(20));
        let result = service.anchor(&record()).await;
        assert!(matches!(result, Err(AppError::LedgerUnavailable(_))));
    }

    #[tokio::test]
    async fn test_rejection_maps_to_anchoring_rejected() {
        let service = LedgerService::new(Arc::new(RejectingLedger), Duration::from_secs(1));
        let result = service.anchor(&record()).await;
        assert!(matches!(result, Err(AppError::AnchoringRejected(_))));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_unavailable() {
        let config = BlockchainConfig {
            gateway_url: Some("http://127.0.0.1:9".to_string()),
            timeout_secs: 1,
            ..BlockchainConfig::default()
        };
        let service = LedgerService::from_config(&config).unwrap();
        let result = service.anchor(&record()).await;
        assert!(matches!(result, Err(AppError::LedgerUnavailable(_))));
    }
}
