//! Utilidades compartidas por los tests de integración
//!
//! Levantan el router completo sobre `MemoryStore` y un ledger de prueba,
//! sin base de datos ni red.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use dpc_registry::config::EnvironmentConfig;
use dpc_registry::controllers::AuthController;
use dpc_registry::models::CertificationRecord;
use dpc_registry::repositories::{MemoryStore, Store};
use dpc_registry::services::{LedgerError, LedgerGateway, LedgerService, LocalLedger};
use dpc_registry::{create_router, AppState};

pub const ADMIN_EMAIL: &str = "admin@platform.test";
pub const ADMIN_PASSWORD: &str = "admin123";

pub fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        jwt_secret: "integration-secret".to_string(),
        bcrypt_cost: 4,
        frontend_url: "https://app.test".to_string(),
        admin_email: Some(ADMIN_EMAIL.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        ..EnvironmentConfig::default()
    }
}

/// Ledger que nunca responde bien
pub struct UnavailableLedger;

#[async_trait]
impl LedgerGateway for UnavailableLedger {
    async fn connect(&self) -> Result<(), LedgerError> {
        Err(LedgerError::Unavailable("connection refused".to_string()))
    }
    fn is_connected(&self) -> bool {
        false
    }
    async fn record_certification(&self, _: &CertificationRecord) -> Result<String, LedgerError> {
        Err(LedgerError::Unavailable("connection refused".to_string()))
    }
    async fn verify_certification(&self, _: &str) -> Result<bool, LedgerError> {
        Err(LedgerError::Unavailable("connection refused".to_string()))
    }
}

/// Ledger que rechaza cada registro
pub struct RejectingLedger;

#[async_trait]
impl LedgerGateway for RejectingLedger {
    async fn connect(&self) -> Result<(), LedgerError> {
        Ok(())
    }
    fn is_connected(&self) -> bool {
        true
    }
    async fn record_certification(&self, _: &CertificationRecord) -> Result<String, LedgerError> {
        Err(LedgerError::Rejected("endorsement policy failure".to_string()))
    }
    async fn verify_certification(&self, _: &str) -> Result<bool, LedgerError> {
        Ok(false)
    }
}

/// Ledger local que cuenta las llamadas de anclaje
#[derive(Default)]
pub struct CountingLedger {
    inner: LocalLedger,
    pub records: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingLedger {
    /// Cada anclaje tarda `delay` antes de responder
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.records.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerGateway for CountingLedger {
    async fn connect(&self) -> Result<(), LedgerError> {
        self.inner.connect().await
    }
    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }
    async fn record_certification(&self, record: &CertificationRecord) -> Result<String, LedgerError> {
        self.records.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.record_certification(record).await
    }
    async fn verify_certification(&self, hash: &str) -> Result<bool, LedgerError> {
        self.inner.verify_certification(hash).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_ledger(Arc::new(LocalLedger::new()), test_config()).await
    }

    pub async fn with_ledger(gateway: Arc<dyn LedgerGateway>, config: EnvironmentConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let ledger = LedgerService::new(gateway, Duration::from_millis(200));
        let state = AppState::new(store.clone() as Arc<dyn Store>, ledger, config);

        AuthController::new(&state)
            .bootstrap_admin()
            .await
            .expect("admin bootstrap");

        Self {
            router: create_router(state.clone()),
            state,
            store,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    // ---- Flujos comunes ----

    pub async fn register(&self, company_name: &str, tax_number: &str, email: &str, password: &str) -> TestResponse {
        self.post("/api/auth/register", None, registration_payload(company_name, tax_number, email, password))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post("/api/auth/login", None, json!({ "email": email, "password": password }))
            .await
    }

    pub async fn admin_token(&self) -> String {
        let response = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["token"].as_str().unwrap().to_string()
    }

    /// Registra, verifica el email y aprueba la empresa; devuelve el token del company_admin
    pub async fn onboard(&self, company_name: &str, email: &str) -> (String, String) {
        let registered = self.register(company_name, "1234567890", email, "secret1").await;
        assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);

        let token = registered.body["verificationToken"].as_str().unwrap().to_string();
        let verified = self.post("/api/auth/verify-email", None, json!({ "token": token })).await;
        assert_eq!(verified.status, StatusCode::OK);

        let company_id = registered.body["companyId"].as_str().unwrap().to_string();
        let admin = self.admin_token().await;
        let approved = self
            .put(
                &format!("/api/admin/companies/{}/status", company_id),
                Some(&admin),
                json!({ "status": "approved" }),
            )
            .await;
        assert_eq!(approved.status, StatusCode::OK, "{:?}", approved.body);

        let login = self.login(email, "secret1").await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);
        (login.body["token"].as_str().unwrap().to_string(), company_id)
    }

    pub async fn create_product(&self, token: &str, name: &str) -> String {
        let response = self
            .post("/api/products", Some(token), json!({ "name": name, "details": { "sku": "T-1" } }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_dpc(&self, token: &str, product_id: &str) -> TestResponse {
        self.post(
            "/api/dpcs",
            Some(token),
            json!({
                "productId": product_id,
                "certificationDetails": { "standard": "EN 71-3", "certifier": "TÜV" }
            }),
        )
        .await
    }
}

pub fn registration_payload(company_name: &str, tax_number: &str, email: &str, password: &str) -> Value {
    json!({
        "companyName": company_name,
        "taxInfo": { "taxNumber": tax_number, "taxOffice": "Kadikoy" },
        "authorizedPerson": {
            "email": email,
            "firstName": "Ada",
            "lastName": "Lovelace",
            "phone": "+90 212 555 0000"
        },
        "password": password,
        "addresses": [
            { "type": "headquarters", "street": "Main Street 1", "city": "Istanbul", "postalCode": "34000" }
        ],
        "documents": [
            { "documentType": "tax_certificate", "filePath": "/uploads/tax.pdf", "originalName": "tax.pdf" }
        ]
    })
}
