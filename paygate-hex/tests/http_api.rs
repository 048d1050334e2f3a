//! Router-level tests for the HTTP adapter, driven with `oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use paygate_hex::{
    PaymentService,
    inbound::{AppState, HttpServer},
};
use paygate_providers::ProviderRegistry;
use paygate_repo::InMemoryTransactionRepository;
use paygate_types::{PaymentApiConfig, TransactionRepository};
use serde_json::{Value, json};
use tower::ServiceExt;

const COMPANY: &str = "company-42";

fn custom_service(repo: Option<Arc<dyn TransactionRepository>>) -> PaymentService {
    let registry = ProviderRegistry::new();
    let provider = registry.provider(&PaymentApiConfig::custom_test()).unwrap();
    PaymentService::new(provider, repo)
}

fn app() -> Router {
    let repo: Arc<dyn TransactionRepository> = Arc::new(InMemoryTransactionRepository::new());
    HttpServer::new(AppState::new(custom_service(Some(repo)))).router()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("X-Company-Id", COMPANY)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-Company-Id", COMPANY)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create_customer(app: &Router) -> String {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/customers",
            json!({"name": "Maria Souza", "cpfCnpj": "98765432100"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn create_payment(app: &Router, customer: &str, billing_type: &str) -> Value {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/payments",
            json!({
                "customer": customer,
                "billingType": billing_type,
                "value": 250.5,
                "dueDate": "2025-02-01",
                "externalReference": "agreement-7"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn test_health_reports_provider() {
    let (status, body) = send(&app(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provider"], "custom");
}

#[tokio::test]
async fn test_customer_registration_is_idempotent() {
    let app = app();
    let first = create_customer(&app).await;

    let second = create_customer(&app).await;
    let (status, found) = send(&app, get("/api/customers?cpfCnpj=987.654.321-00")).await;

    assert_eq!(first, second);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["id"], first.as_str());
}

#[tokio::test]
async fn test_unknown_customer_is_404() {
    let (status, body) = send(&app(), get("/api/customers?cpfCnpj=11111111111")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "CUSTOMER_NOT_FOUND");
}

#[tokio::test]
async fn test_pix_flow_through_simulation_and_webhook() {
    let app = app();
    let customer = create_customer(&app).await;
    let payment = create_payment(&app, &customer, "PIX").await;
    let id = payment["id"].as_str().unwrap().to_string();

    assert_eq!(payment["status"], "pending");
    assert_eq!(payment["value"], 250.5);
    assert!(payment["pixQrCodeUrl"].as_str().is_some_and(|u| !u.is_empty()));

    let (status, confirmed) = send(
        &app,
        json_request(Method::POST, &format!("/api/payments/{id}/simulate/confirm"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "confirmed");

    let (_, received) = send(
        &app,
        json_request(Method::POST, &format!("/api/payments/{id}/simulate/receive"), json!({})),
    )
    .await;
    assert_eq!(received["status"], "received");

    let (status, ack) = send(
        &app,
        json_request(
            Method::POST,
            "/api/webhooks",
            json!({
                "event": "PAYMENT_RECEIVED",
                "payment": {"id": id, "customer": customer, "value": 250.5, "status": "received"}
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["received"], true);
    assert_eq!(ack["event"], "PAYMENT_RECEIVED");
    assert_eq!(ack["paymentId"], id.as_str());
}

#[tokio::test]
async fn test_external_reference_lookup() {
    let app = app();
    let customer = create_customer(&app).await;
    let payment = create_payment(&app, &customer, "BOLETO").await;

    let (status, found) = send(&app, get("/api/payments?externalReference=agreement-7")).await;
    let (missing, _) = send(&app, get("/api/payments?externalReference=agreement-8")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["id"], payment["id"]);
    assert_eq!(missing, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_transition_is_conflict() {
    let app = app();
    let customer = create_customer(&app).await;
    let payment = create_payment(&app, &customer, "BOLETO").await;
    let id = payment["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        json_request(Method::POST, &format!("/api/payments/{id}/cancel"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        json_request(Method::POST, &format!("/api/payments/{id}/refund"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATUS_TRANSITION");
}

#[tokio::test]
async fn test_missing_payment_is_404_with_code() {
    let (status, body) = send(&app(), get("/api/payments/test_pay_000000000000")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PAYMENT_NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_simulation_action_is_400() {
    let (status, _) = send(
        &app(),
        json_request(Method::POST, "/api/payments/test_pay_1/simulate/settle", json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_webhook_is_400() {
    let (status, body) = send(
        &app(),
        json_request(Method::POST, "/api/webhooks", json!({"event": "PAYMENT_RECEIVED"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_WEBHOOK");
}

#[tokio::test]
async fn test_webhook_token_enforced() {
    let state = AppState::new(custom_service(None)).with_webhook_token(Some("whsec_1".into()));
    let app = HttpServer::new(state).router();
    let body = json!({"event": "PAYMENT_CREATED", "payment": {"id": "test_pay_1"}});

    let (rejected, _) = send(&app, json_request(Method::POST, "/api/webhooks", body.clone())).await;

    let mut request = json_request(Method::POST, "/api/webhooks", body);
    request
        .headers_mut()
        .insert("asaas-access-token", "whsec_1".parse().unwrap());
    let (accepted, _) = send(&app, request).await;

    assert_eq!(rejected, StatusCode::UNAUTHORIZED);
    assert_eq!(accepted, StatusCode::OK);
}

#[tokio::test]
async fn test_transactions_listed_for_tenant() {
    let app = app();
    create_customer(&app).await;

    let (status, logs) = send(&app, get("/api/transactions")).await;
    let (_, by_provider) = send(&app, get("/api/transactions?provider=custom&limit=1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs.as_array().map(Vec::len), Some(1));
    assert_eq!(logs[0]["operation"], "createCustomer");
    assert_eq!(logs[0]["company_id"], COMPANY);
    assert_eq!(by_provider.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_transactions_never_cross_tenants() {
    let app = app();
    create_customer(&app).await;
    let as_intruder = |uri: &str| {
        Request::builder()
            .uri(uri)
            .header("X-Company-Id", "intruder")
            .body(Body::empty())
            .unwrap()
    };

    let (_, own) = send(&app, as_intruder("/api/transactions")).await;
    let (_, by_provider) = send(&app, as_intruder("/api/transactions?provider=custom")).await;
    let (_, by_query) = send(&app, as_intruder("/api/transactions?companyId=company-42")).await;

    assert_eq!(own.as_array().map(Vec::len), Some(0));
    assert_eq!(by_provider.as_array().map(Vec::len), Some(0));
    assert_eq!(by_query.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_transactions_require_tenant_header() {
    let request = Request::builder()
        .uri("/api/transactions?provider=custom")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_rate_limit_is_per_tenant() {
    let state = AppState::new(custom_service(None));
    let app = HttpServer::with_rate_limit(state, 2, Duration::from_secs(60)).router();
    let request = |company: &str| {
        Request::builder()
            .uri("/api/payments/test_pay_1")
            .header("X-Company-Id", company)
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        let (status, _) = send(&app, request("company-a")).await;
        assert_ne!(status, StatusCode::TOO_MANY_REQUESTS);
    }
    let (limited, body) = send(&app, request("company-a")).await;
    let (other, _) = send(&app, request("company-b")).await;
    let (health, _) = send(&app, get("/health")).await;

    assert_eq!(limited, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "RATE_LIMITED");
    assert_ne!(other, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(health, StatusCode::OK);
}
