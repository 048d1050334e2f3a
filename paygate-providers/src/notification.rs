//! Structural parsing shared by the provider webhook parsers.

use paygate_types::{PaymentError, WebhookPayment};
use rust_decimal::Decimal;
use serde_json::Value;

/// A notification body with its payment section validated but the event
/// name still in the provider's vocabulary.
pub(crate) struct RawNotification {
    pub event: String,
    pub payment: WebhookPayment,
}

/// Reads `{event, payment: {...}}`, rejecting bodies without `payment.id`.
pub(crate) fn read_notification(provider: &str, body: &[u8]) -> Result<RawNotification, PaymentError> {
    let data: Value = serde_json::from_slice(body)
        .map_err(|e| PaymentError::invalid_webhook(provider, format!("body is not JSON: {e}")))?;

    let payment = data
        .get("payment")
        .filter(|p| p.is_object())
        .ok_or_else(|| PaymentError::invalid_webhook(provider, "missing payment.id"))?;

    let id = payment
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| PaymentError::invalid_webhook(provider, "missing payment.id"))?;

    let text = |key: &str| payment.get(key).and_then(Value::as_str).map(str::to_string);

    let value = match payment.get("value") {
        None | Some(Value::Null) => Decimal::ZERO,
        Some(raw) => serde_json::from_value(raw.clone()).map_err(|_| {
            PaymentError::invalid_webhook(provider, "payment.value is not a number")
        })?,
    };

    Ok(RawNotification {
        event: data
            .get("event")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        payment: WebhookPayment {
            id: id.to_string(),
            customer: text("customer").unwrap_or_default(),
            value,
            status: text("status").unwrap_or_default(),
            external_reference: text("externalReference"),
            subscription: text("subscription"),
            description: text("description"),
        },
    })
}
