mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestApp, ADMIN_EMAIL};

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let response = app.get("/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_registration_to_login_flow() {
    let app = TestApp::new().await;

    let registered = app.register("Acme", "1234567890", "a@acme.com", "secret1").await;
    assert_eq!(registered.status, StatusCode::CREATED);
    let token = registered.body["verificationToken"].as_str().unwrap().to_string();
    let company_id = registered.body["companyId"].as_str().unwrap().to_string();
    assert!(registered.body["verificationUrl"]
        .as_str()
        .unwrap()
        .starts_with("https://app.test/verify-email?token="));

    let before_verification = app.login("a@acme.com", "secret1").await;
    assert_eq!(before_verification.status, StatusCode::FORBIDDEN);
    assert_eq!(before_verification.body["code"], "EMAIL_NOT_VERIFIED");

    let verified = app
        .post("/api/auth/verify-email", None, json!({ "token": token }))
        .await;
    assert_eq!(verified.status, StatusCode::OK);

    let before_approval = app.login("a@acme.com", "secret1").await;
    assert_eq!(before_approval.status, StatusCode::FORBIDDEN);
    assert_eq!(before_approval.body["code"], "COMPANY_NOT_APPROVED");

    let admin = app.admin_token().await;
    let approved = app
        .put(
            &format!("/api/admin/companies/{}/status", company_id),
            Some(&admin),
            json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK);
    assert_eq!(approved.body["approved"], true);

    let login = app.login("a@acme.com", "secret1").await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["user"]["role"], "company_admin");
    assert_eq!(login.body["user"]["companyId"], company_id.as_str());
    assert!(login.body["token"].as_str().is_some());
}

#[tokio::test]
async fn test_registration_validation_lists_fields() {
    let app = TestApp::new().await;
    let response = app.register("", "123", "not-an-email", "abc").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = response.body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"company_name"));
    assert!(fields.contains(&"password"));
    assert!(fields.contains(&"tax_info.tax_number"));
    assert!(fields.contains(&"authorized_person.email"));
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = TestApp::new().await;
    let response = app
        .post("/api/auth/login", None, json!({ "email": "a@acme.com" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = TestApp::new().await;
    app.register("Acme", "1234567890", "a@acme.com", "secret1").await;

    let again = app.register("Other", "9876543210", "A@Acme.com", "secret2").await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.body["code"], "DUPLICATE_EMAIL");
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_look_the_same() {
    let app = TestApp::new().await;
    app.register("Acme", "1234567890", "a@acme.com", "secret1").await;

    let unknown = app.login("nobody@acme.com", "secret1").await;
    let wrong = app.login("a@acme.com", "wrong-password").await;

    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body, wrong.body);
}

#[tokio::test]
async fn test_verify_email_link_is_single_use() {
    let app = TestApp::new().await;
    let registered = app.register("Acme", "1234567890", "a@acme.com", "secret1").await;
    let token = registered.body["verificationToken"].as_str().unwrap();

    let first = app
        .get(&format!("/api/auth/verify-email?token={}", token), None)
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app
        .post("/api/auth/verify-email", None, json!({ "token": token }))
        .await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.body["code"], "INVALID_OR_EXPIRED_TOKEN");
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new().await;
    app.onboard("Acme", "a@acme.com").await;

    let unknown = app
        .post("/api/auth/forgot-password", None, json!({ "email": "ghost@acme.com" }))
        .await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert!(unknown.body.get("resetToken").is_none());

    let forgot = app
        .post("/api/auth/forgot-password", None, json!({ "email": "a@acme.com" }))
        .await;
    assert_eq!(forgot.status, StatusCode::OK);
    assert_eq!(forgot.body["message"], unknown.body["message"]);
    let reset_token = forgot.body["resetToken"].as_str().unwrap().to_string();

    let reset = app
        .post(
            "/api/auth/reset-password",
            None,
            json!({ "token": reset_token, "password": "brand-new-1" }),
        )
        .await;
    assert_eq!(reset.status, StatusCode::OK);

    assert_eq!(app.login("a@acme.com", "secret1").await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.login("a@acme.com", "brand-new-1").await.status, StatusCode::OK);

    let reused = app
        .post(
            "/api/auth/reset-password",
            None,
            json!({ "token": reset_token, "password": "another-1" }),
        )
        .await;
    assert_eq!(reused.body["code"], "INVALID_OR_EXPIRED_TOKEN");
}

#[tokio::test]
async fn test_verification_token_cannot_reset_password() {
    let app = TestApp::new().await;
    let registered = app.register("Acme", "1234567890", "a@acme.com", "secret1").await;
    let token = registered.body["verificationToken"].as_str().unwrap();

    let response = app
        .post(
            "/api/auth/reset-password",
            None,
            json!({ "token": token, "password": "hijacked1" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "INVALID_OR_EXPIRED_TOKEN");
}

#[tokio::test]
async fn test_me_requires_authentication() {
    let app = TestApp::new().await;

    let anonymous = app.get("/api/auth/me", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.body["code"], "UNAUTHENTICATED");

    let garbage = app.get("/api/auth/me", Some("not.a.jwt")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let admin = app.admin_token().await;
    let me = app.get("/api/auth/me", Some(&admin)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], ADMIN_EMAIL);
    assert_eq!(me.body["role"], "admin");
    assert!(me.body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_admin_routes_reject_company_admin() {
    let app = TestApp::new().await;
    let (token, company_id) = app.onboard("Acme", "a@acme.com").await;

    let list = app.get("/api/admin/companies", Some(&token)).await;
    assert_eq!(list.status, StatusCode::FORBIDDEN);

    let review = app
        .put(
            &format!("/api/admin/companies/{}/status", company_id),
            Some(&token),
            json!({ "status": "rejected" }),
        )
        .await;
    assert_eq!(review.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_lists_companies_with_users_and_documents() {
    let app = TestApp::new().await;
    app.register("Acme", "1234567890", "a@acme.com", "secret1").await;
    let admin = app.admin_token().await;

    let companies = app.get("/api/admin/companies", Some(&admin)).await;
    assert_eq!(companies.status, StatusCode::OK);
    let acme = companies
        .body
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Acme")
        .unwrap();
    assert_eq!(acme["status"], "pending");
    assert_eq!(acme["users"][0]["email"], "a@acme.com");
    assert_eq!(acme["documents"][0]["documentInfo"]["documentType"], "tax_certificate");

    let documents = app.get("/api/admin/documents", Some(&admin)).await;
    assert_eq!(documents.body.as_array().unwrap().len(), 1);
    assert_eq!(documents.body[0]["company"]["name"], "Acme");
}

#[tokio::test]
async fn test_company_status_accepts_legacy_boolean() {
    let app = TestApp::new().await;
    let registered = app.register("Acme", "1234567890", "a@acme.com", "secret1").await;
    let company_id = registered.body["companyId"].as_str().unwrap();
    let admin = app.admin_token().await;

    let response = app
        .put(
            &format!("/api/admin/companies/{}/status", company_id),
            Some(&admin),
            json!({ "status": false }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "rejected");
    assert_eq!(response.body["approved"], false);
}

#[tokio::test]
async fn test_document_review_rejects_unknown_status() {
    let app = TestApp::new().await;
    app.register("Acme", "1234567890", "a@acme.com", "secret1").await;
    let admin = app.admin_token().await;
    let documents = app.get("/api/admin/documents", Some(&admin)).await;
    let document_id = documents.body[0]["id"].as_str().unwrap().to_string();

    let pending = app
        .put(
            &format!("/api/admin/documents/{}/status", document_id),
            Some(&admin),
            json!({ "status": "pending" }),
        )
        .await;
    assert_eq!(pending.status, StatusCode::BAD_REQUEST);
    assert_eq!(pending.body["code"], "INVALID_TRANSITION");

    let approved = app
        .put(
            &format!("/api/admin/documents/{}/status", document_id),
            Some(&admin),
            json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK);
    assert_eq!(approved.body["status"], "approved");

    let remaining = app.get("/api/admin/documents", Some(&admin)).await;
    assert!(remaining.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_company_admin_manages_users() {
    let app = TestApp::new().await;
    let (token, company_id) = app.onboard("Acme", "a@acme.com").await;

    let created = app
        .post(
            "/api/users",
            Some(&token),
            json!({
                "email": "worker@acme.com",
                "password": "worker1",
                "personalInfo": { "firstName": "Grace", "lastName": "Hopper" },
                "role": "admin"
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["role"], "user");
    assert_eq!(created.body["companyId"], company_id.as_str());
    let user_id = created.body["id"].as_str().unwrap().to_string();

    let list = app.get("/api/users", Some(&token)).await;
    assert_eq!(list.body.as_array().unwrap().len(), 2);

    let updated = app
        .put(&format!("/api/users/{}", user_id), Some(&token), json!({ "active": false }))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["active"], false);
    assert_eq!(updated.body["personalInfo"]["firstName"], "Grace");

    let worker_login = app.login("worker@acme.com", "worker1").await;
    assert_eq!(worker_login.body["code"], "EMAIL_NOT_VERIFIED");

    let deleted = app.delete(&format!("/api/users/{}", user_id), Some(&token)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let gone = app.get(&format!("/api/users/{}", user_id), Some(&token)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_plain_user_cannot_manage_users_or_delete_products() {
    let app = TestApp::new().await;
    let (token, _) = app.onboard("Acme", "a@acme.com").await;
    app.post(
        "/api/users",
        Some(&token),
        json!({ "email": "worker@acme.com", "password": "worker1" }),
    )
    .await;
    let worker = app.login("worker@acme.com", "worker1").await;
    let worker_token = worker.body["token"].as_str().unwrap().to_string();

    let list = app.get("/api/users", Some(&worker_token)).await;
    assert_eq!(list.status, StatusCode::FORBIDDEN);

    let product_id = app.create_product(&worker_token, "Toy").await;
    let delete = app
        .delete(&format!("/api/products/{}", product_id), Some(&worker_token))
        .await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_company_profile_update_and_sub_resources() {
    let app = TestApp::new().await;
    let (token, company_id) = app.onboard("Acme", "a@acme.com").await;

    let updated = app
        .put(
            &format!("/api/companies/{}", company_id),
            Some(&token),
            json!({ "name": "Acme Industries" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["name"], "Acme Industries");
    assert_eq!(updated.body["taxInfo"]["taxNumber"], "1234567890");
    assert_eq!(updated.body["status"], "approved");

    let address = app
        .post(
            &format!("/api/companies/{}/addresses", company_id),
            Some(&token),
            json!({ "type": "factory", "street": "Industrial 5", "city": "Bursa" }),
        )
        .await;
    assert_eq!(address.status, StatusCode::CREATED);
    let addresses = app
        .get(&format!("/api/companies/{}/addresses", company_id), Some(&token))
        .await;
    assert_eq!(addresses.body.as_array().unwrap().len(), 2);

    let document = app
        .post(
            &format!("/api/companies/{}/documents", company_id),
            Some(&token),
            json!({ "documentType": "iso_9001", "filePath": "/uploads/iso.pdf" }),
        )
        .await;
    assert_eq!(document.status, StatusCode::CREATED);
    assert_eq!(document.body["status"], "pending");
}

#[tokio::test]
async fn test_cross_tenant_access_is_not_found() {
    let app = TestApp::new().await;
    let (acme, acme_id) = app.onboard("Acme", "a@acme.com").await;
    let (globex, _) = app.onboard("Globex", "g@globex.com").await;

    let product_id = app.create_product(&acme, "Toy").await;
    let dpc = app.create_dpc(&acme, &product_id).await;
    let dpc_id = dpc.body["id"].as_str().unwrap();

    assert_eq!(
        app.get(&format!("/api/companies/{}", acme_id), Some(&globex)).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get(&format!("/api/products/{}", product_id), Some(&globex)).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get(&format!("/api/dpcs/{}", dpc_id), Some(&globex)).await.status,
        StatusCode::NOT_FOUND
    );

    let foreign_dpc = app.create_dpc(&globex, &product_id).await;
    assert_eq!(foreign_dpc.status, StatusCode::NOT_FOUND);

    let globex_products = app.get("/api/products", Some(&globex)).await;
    assert!(globex_products.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_product_listing_includes_dpcs_and_delete_cascades() {
    let app = TestApp::new().await;
    let (token, _) = app.onboard("Acme", "a@acme.com").await;
    let product_id = app.create_product(&token, "Toy").await;
    app.create_dpc(&token, &product_id).await;

    let products = app.get("/api/products", Some(&token)).await;
    assert_eq!(products.body[0]["name"], "Toy");
    assert_eq!(products.body[0]["details"]["sku"], "T-1");
    assert_eq!(products.body[0]["dpcs"].as_array().unwrap().len(), 1);

    let updated = app
        .put(
            &format!("/api/products/{}", product_id),
            Some(&token),
            json!({ "active": false }),
        )
        .await;
    assert_eq!(updated.body["active"], false);
    assert_eq!(updated.body["name"], "Toy");

    let deleted = app
        .delete(&format!("/api/products/{}", product_id), Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let dpcs = app.get("/api/dpcs", Some(&token)).await;
    assert!(dpcs.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_approved_dpc_hash_is_publicly_verifiable() {
    let app = TestApp::new().await;
    let (token, _) = app.onboard("Acme", "a@acme.com").await;
    let product_id = app.create_product(&token, "Toy").await;
    let dpc = app.create_dpc(&token, &product_id).await;
    assert_eq!(dpc.body["status"], "pending");
    assert!(dpc.body["blockchainHash"].is_null());

    let admin = app.admin_token().await;
    let pending = app.get("/api/admin/dpcs", Some(&admin)).await;
    assert_eq!(pending.body[0]["product"]["name"], "Toy");

    let approved = app
        .put(
            &format!("/api/admin/dpcs/{}/status", dpc.body["id"].as_str().unwrap()),
            Some(&admin),
            json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK);
    let hash = approved.body["blockchainHash"].as_str().unwrap().to_string();

    let verified = app.get(&format!("/api/verify/{}", hash), None).await;
    assert_eq!(verified.status, StatusCode::OK);
    assert_eq!(verified.body["valid"], true);

    let unknown = app.get("/api/verify/ffff", None).await;
    assert_eq!(unknown.body["valid"], false);
}

#[tokio::test]
async fn test_ledger_outage_does_not_expose_gateway_address() {
    let gateway = dpc_registry::services::HttpLedgerGateway::new(
        "http://127.0.0.1:9",
        dpc_registry::config::environment::BlockchainConfig::default(),
    )
    .unwrap();
    let app = TestApp::with_ledger(std::sync::Arc::new(gateway), common::test_config()).await;
    let (token, _) = app.onboard("Acme", "a@acme.com").await;
    let product_id = app.create_product(&token, "Toy").await;
    let dpc = app.create_dpc(&token, &product_id).await;
    let dpc_id = dpc.body["id"].as_str().unwrap();

    let admin = app.admin_token().await;
    let response = app
        .put(
            &format!("/api/admin/dpcs/{}/status", dpc_id),
            Some(&admin),
            json!({ "status": "approved" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["code"], "LEDGER_UNAVAILABLE");
    let body = response.body.to_string();
    assert!(!body.contains("127.0.0.1"), "{}", body);
    assert!(!body.contains("/health"), "{}", body);
}

#[tokio::test]
async fn test_company_admin_cannot_remove_own_account() {
    let app = TestApp::new().await;
    let (token, _) = app.onboard("Acme", "a@acme.com").await;
    let me = app.get("/api/auth/me", Some(&token)).await;
    let own_id = me.body["id"].as_str().unwrap().to_string();
    let uri = format!("/api/users/{}", own_id);

    let deactivate = app.put(&uri, Some(&token), json!({ "active": false })).await;
    assert_eq!(deactivate.status, StatusCode::FORBIDDEN);

    let delete = app.delete(&uri, Some(&token)).await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let rename = app
        .put(
            &uri,
            Some(&token),
            json!({ "personalInfo": { "firstName": "Ada", "lastName": "Lovelace" } }),
        )
        .await;
    assert_eq!(rename.status, StatusCode::OK);
    assert_eq!(app.get("/api/products", Some(&token)).await.status, StatusCode::OK);
}
