//! End-to-end lifecycle through the registry-selected custom gateway.

use chrono::{NaiveDate, Utc};
use paygate_providers::ProviderRegistry;
use paygate_types::{
    AgreementUpdate, BillingType, CreateCustomerParams, CreatePaymentParams, PaymentApiConfig,
    PaymentError, PaymentStatus, RefundParams, WebhookEventType,
};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn test_pix_payment_settles_and_reconciles() {
    let registry = ProviderRegistry::new();
    let provider = registry.provider(&PaymentApiConfig::custom_test()).unwrap();

    let customer = provider
        .create_customer(CreateCustomerParams::new("Maria Souza", "98765432100"))
        .await
        .unwrap();
    let payment = provider
        .create_payment(CreatePaymentParams::new(
            &customer.id,
            BillingType::Pix,
            dec!(250.5),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.value, dec!(250.5));
    assert!(payment.pix_qr_code_url.as_deref().is_some_and(|u| !u.is_empty()));

    let simulation = provider.simulation().unwrap();
    let confirmed = simulation.simulate_confirmation(&payment.id).unwrap();
    assert_eq!(confirmed.status, PaymentStatus::Confirmed);
    let received = simulation.simulate_receipt(&payment.id).unwrap();
    assert_eq!(received.status, PaymentStatus::Received);

    let body = json!({
        "event": "PAYMENT_RECEIVED",
        "payment": {
            "id": payment.id,
            "customer": customer.id,
            "value": 250.5,
            "status": "received"
        }
    });
    let webhook = provider
        .parse_webhook(body.to_string().as_bytes())
        .unwrap();
    assert_eq!(webhook.event, WebhookEventType::PaymentReceived);

    let update = AgreementUpdate::derive(webhook.event.as_ref(), "confirmed", "active", Utc::now());

    assert_eq!(update.payment_status, "received");
    assert_eq!(update.status, "paid");
    assert!(update.payment_received_at.is_some());
}

#[tokio::test]
async fn test_state_shared_across_registry_lookups() {
    let registry = ProviderRegistry::new();
    let config = PaymentApiConfig::custom_test();

    let customer = registry
        .provider(&config)
        .unwrap()
        .create_customer(CreateCustomerParams::new("Maria Souza", "987.654.321-00"))
        .await
        .unwrap();

    let found = registry
        .provider(&config)
        .unwrap()
        .get_customer_by_cpf_cnpj("98765432100")
        .await
        .unwrap();

    assert_eq!(found.map(|c| c.id), Some(customer.id));
}

#[tokio::test]
async fn test_terminal_payment_rejects_further_changes() {
    let registry = ProviderRegistry::new();
    let provider = registry.provider(&PaymentApiConfig::custom_test()).unwrap();
    let customer = provider
        .create_customer(CreateCustomerParams::new("João Lima", "11222333000181"))
        .await
        .unwrap();
    let payment = provider
        .create_payment(
            CreatePaymentParams::new(
                &customer.id,
                BillingType::Boleto,
                dec!(89.9),
                NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            )
            .with_external_reference("agreement-9"),
        )
        .await
        .unwrap();

    provider.cancel_payment(&payment.id).await.unwrap();

    let refund = provider.refund_payment(RefundParams::full(&payment.id)).await;
    assert!(matches!(refund, Err(PaymentError::InvalidTransition { .. })));

    let by_reference = provider
        .get_payment_by_external_reference("agreement-9")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_reference.status, PaymentStatus::Cancelled);
}

#[tokio::test]
async fn test_unknown_payment_lookup_fails() {
    let registry = ProviderRegistry::new();
    let provider = registry.provider(&PaymentApiConfig::custom_test()).unwrap();

    let err = provider.get_payment("test_pay_000000000000").await.err().unwrap();

    assert_eq!(err.code(), "PAYMENT_NOT_FOUND");
    assert!(provider
        .get_payment_by_external_reference("nope")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_lifecycle_is_visible_on_every_reread() {
    let registry = ProviderRegistry::new();
    let provider = registry.provider(&PaymentApiConfig::custom_test()).unwrap();
    let customer = provider
        .create_customer(CreateCustomerParams::new("Ana Costa", "12345678909"))
        .await
        .unwrap();
    let payment = provider
        .create_payment(
            CreatePaymentParams::new(
                &customer.id,
                BillingType::Pix,
                dec!(120),
                NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
            )
            .with_external_reference("agreement_test_001"),
        )
        .await
        .unwrap();
    let simulation = provider.simulation().unwrap();

    let mut seen = vec![provider.get_payment(&payment.id).await.unwrap().status];
    simulation.simulate_confirmation(&payment.id).unwrap();
    seen.push(provider.get_payment(&payment.id).await.unwrap().status);
    simulation.simulate_receipt(&payment.id).unwrap();
    seen.push(provider.get_payment(&payment.id).await.unwrap().status);

    assert_eq!(
        seen,
        vec![
            PaymentStatus::Pending,
            PaymentStatus::Confirmed,
            PaymentStatus::Received
        ]
    );

    let refunded = provider
        .refund_payment(RefundParams::full(&payment.id))
        .await
        .unwrap();
    let reread = provider.get_payment(&payment.id).await.unwrap();

    assert_eq!(refunded.status, PaymentStatus::Refunded);
    assert_eq!(reread.status, PaymentStatus::Refunded);
    assert_eq!(reread.value, dec!(120));
}

#[tokio::test]
async fn test_external_reference_resolves_to_created_payment() {
    let registry = ProviderRegistry::new();
    let provider = registry.provider(&PaymentApiConfig::custom_test()).unwrap();
    let customer = provider
        .create_customer(CreateCustomerParams::new("Ana Costa", "12345678909"))
        .await
        .unwrap();
    let created = provider
        .create_payment(
            CreatePaymentParams::new(
                &customer.id,
                BillingType::Boleto,
                dec!(75.25),
                NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            )
            .with_external_reference("agreement_test_001"),
        )
        .await
        .unwrap();

    let found = provider
        .get_payment_by_external_reference("agreement_test_001")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.id, created.id);
    assert_eq!(found.external_reference.as_deref(), Some("agreement_test_001"));
    assert_eq!(found.customer_id, customer.id);
}
