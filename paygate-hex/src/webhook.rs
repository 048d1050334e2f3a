//! Webhook Service
//!
//! Turns provider notifications into agreement state patches. Applying the
//! patch, and deduplicating re-delivered notifications, is the caller's job.

use std::sync::Arc;

use chrono::Utc;

use paygate_types::{AgreementUpdate, PaymentError, PaymentProvider, WebhookPayload};

pub struct WebhookService {
    provider: Arc<dyn PaymentProvider>,
}

impl WebhookService {
    pub fn new(provider: Arc<dyn PaymentProvider>) -> Self {
        Self { provider }
    }

    /// Parses a raw body with the active provider's parser.
    #[tracing::instrument(skip(self, body), fields(provider = %self.provider.name(), bytes = body.len()))]
    pub fn parse_webhook(&self, body: &[u8]) -> Result<WebhookPayload, PaymentError> {
        let payload = self.provider.parse_webhook(body)?;
        tracing::info!(
            event = %payload.event,
            payment_id = %payload.payment.id,
            "Webhook parsed"
        );
        Ok(payload)
    }

    /// Derives the agreement patch for `event`, stamped with the current time.
    pub fn derive_status_update(
        &self,
        event: &str,
        current_payment_status: &str,
        current_agreement_status: &str,
    ) -> AgreementUpdate {
        AgreementUpdate::derive(
            event,
            current_payment_status,
            current_agreement_status,
            Utc::now(),
        )
    }
}
