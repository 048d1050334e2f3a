//! Agreement state derivation from webhook events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::webhook::WebhookEventType;

/// Patch a caller applies to its own persisted agreement record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementUpdate {
    pub payment_status: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_received_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl AgreementUpdate {
    /// Derives the agreement patch for `event` given the currently stored statuses.
    ///
    /// Unrecognized events keep both statuses; `updated_at` is always `now`.
    pub fn derive(
        event: &str,
        current_payment_status: &str,
        current_agreement_status: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let mut payment_status = current_payment_status.to_string();
        let mut status = current_agreement_status.to_string();
        let mut payment_received_at = None;

        match event.parse::<WebhookEventType>() {
            Ok(WebhookEventType::PaymentCreated) => payment_status = "pending".into(),
            Ok(WebhookEventType::PaymentConfirmed) => payment_status = "confirmed".into(),
            Ok(WebhookEventType::PaymentReceived) => {
                payment_status = "received".into();
                status = "paid".into();
                payment_received_at = Some(now);
            }
            Ok(WebhookEventType::PaymentOverdue) => payment_status = "overdue".into(),
            Ok(WebhookEventType::PaymentRefunded) => {
                payment_status = "refunded".into();
                status = "cancelled".into();
            }
            Ok(WebhookEventType::PaymentDeleted) => status = "cancelled".into(),
            Err(_) => {}
        }

        Self {
            payment_status,
            status,
            payment_received_at,
            updated_at: now,
        }
    }
}
