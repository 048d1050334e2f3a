//! Client example driving a full simulated payment flow against a running server.
//!
//! Run with: cargo run -p paygate-app --example client_example

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::NaiveDate;
use paygate_client::{PaygateClient, TransactionFilter};
use paygate_hex::{
    PaymentService,
    inbound::{AppState, HttpServer},
};
use paygate_providers::ProviderRegistry;
use paygate_repo::InMemoryTransactionRepository;
use paygate_types::{
    AgreementUpdate, BillingType, CreateCustomerParams, CreatePaymentParams, PaymentApiConfig,
    TransactionRepository,
};
use rust_decimal_macros::dec;
use tokio::net::TcpListener;

const WEBHOOK_TOKEN: &str = "whsec_example";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Custom gateway in test mode: no external calls
    let config = PaymentApiConfig::custom_test();
    let registry = ProviderRegistry::new();
    let provider = registry.provider(&config)?;
    let repository: Arc<dyn TransactionRepository> = Arc::new(InMemoryTransactionRepository::new());
    let service = PaymentService::new(provider, Some(repository));
    let state = AppState::new(service).with_webhook_token(Some(WEBHOOK_TOKEN.into()));
    let router = HttpServer::new(state).router();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    println!("🚀 Starting server on {addr} (provider: {})", config.provider);

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router.into_make_service()).await {
            eprintln!("server error: {err}");
        }
    });

    let client = PaygateClient::new(format!("http://{addr}")).with_company_id("company-42");

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: PIX payment for a debt agreement
    // ─────────────────────────────────────────────────────────────────────────

    let health = client.health().await?;
    println!("✅ Server health: {health}");

    let customer = client
        .create_customer(&CreateCustomerParams::new("Maria Souza", "987.654.321-00"))
        .await?;
    println!("✅ Registered customer: {} (id={})", customer.name, customer.id);

    let again = client
        .create_customer(&CreateCustomerParams::new("Maria Souza", "98765432100"))
        .await?;
    println!("   Same document, same customer: {}", again.id == customer.id);

    let due = NaiveDate::from_ymd_opt(2025, 2, 1).ok_or_else(|| anyhow::anyhow!("bad date"))?;
    let payment = client
        .create_payment(
            &CreatePaymentParams::new(&customer.id, BillingType::Pix, dec!(250.50), due)
                .with_external_reference("agreement-7")
                .with_description("Agreement 7 - installment 1"),
        )
        .await?;
    println!(
        "✅ Created payment {} for R$ {} ({})",
        payment.id, payment.value, payment.status
    );
    if let Some(url) = &payment.pix_qr_code_url {
        println!("   PIX QR code: {url}");
    }

    let confirmed = client.simulate(&payment.id, "confirm").await?;
    println!("✅ Simulated confirmation: {}", confirmed.status);
    let received = client.simulate(&payment.id, "receive").await?;
    println!("✅ Simulated receipt: {}", received.status);

    // The gateway would now notify us
    let ack = client
        .send_webhook(
            &serde_json::json!({
                "event": "PAYMENT_RECEIVED",
                "payment": {
                    "id": received.id,
                    "customer": customer.id,
                    "value": 250.5,
                    "status": "received"
                }
            }),
            Some(WEBHOOK_TOKEN),
        )
        .await?;
    println!("✅ Webhook accepted: {} for {}", ack.event, ack.payment_id);

    let update = AgreementUpdate::derive(&ack.event, "confirmed", "active", chrono::Utc::now());
    println!(
        "   Agreement patch: payment_status={} status={}",
        update.payment_status, update.status
    );

    // A received payment can still be refunded, but not cancelled afterwards
    let refunded = client.refund_payment(&payment.id, None, Some("Duplicate")).await?;
    println!("✅ Refunded: {}", refunded.status);
    if let Err(err) = client.cancel_payment(&payment.id).await {
        println!("✅ Cancel after refund rejected: {:?}", err.code());
    }

    let logs = client.list_transactions(&TransactionFilter::default()).await?;
    println!("\n📋 Audit trail for company-42:");
    for log in logs.iter().rev() {
        println!(
            "   - {} {} ({} ms){}",
            log.provider,
            log.operation,
            log.duration_ms,
            log.error_message
                .as_deref()
                .map(|e| format!(" error: {e}"))
                .unwrap_or_default()
        );
    }

    println!("\n🎉 Example completed successfully!");

    Ok(())
}
