//! Payment Application Service
//!
//! Forwards every call to the active provider and records one audit-log
//! entry per attempt. Contains NO provider logic.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::{Value, json};

use paygate_types::{
    CreateCustomerParams, CreatePaymentParams, NewTransactionLog, PaymentError, PaymentProvider,
    ProviderCustomer, ProviderPayment, RefundParams, TransactionRepository, WebhookPayload,
};

use crate::security::sanitize_for_log;

/// Lifecycle event a simulated backend can be told to fabricate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationAction {
    Confirm,
    Receive,
    Overdue,
    Delete,
}

impl SimulationAction {
    fn operation(self) -> &'static str {
        match self {
            Self::Confirm => "simulateConfirmation",
            Self::Receive => "simulateReceipt",
            Self::Overdue => "simulateOverdue",
            Self::Delete => "simulateDeletion",
        }
    }
}

impl std::str::FromStr for SimulationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirm" => Ok(Self::Confirm),
            "receive" => Ok(Self::Receive),
            "overdue" => Ok(Self::Overdue),
            "delete" => Ok(Self::Delete),
            _ => Err(format!("Unknown simulation action: {}", s)),
        }
    }
}

/// Audited facade over the active payment provider.
///
/// Errors from the provider are returned unchanged. Audit-log failures are
/// reported through `tracing` and never reach the caller. Without a
/// repository nothing is recorded.
pub struct PaymentService {
    provider: Arc<dyn PaymentProvider>,
    repository: Option<Arc<dyn TransactionRepository>>,
}

impl PaymentService {
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        repository: Option<Arc<dyn TransactionRepository>>,
    ) -> Self {
        Self {
            provider,
            repository,
        }
    }

    /// Name of the provider every call is forwarded to.
    pub fn active_provider(&self) -> &str {
        self.provider.name()
    }

    pub fn provider(&self) -> &Arc<dyn PaymentProvider> {
        &self.provider
    }

    pub fn repository(&self) -> Option<&Arc<dyn TransactionRepository>> {
        self.repository.as_ref()
    }

    pub fn supports_simulation(&self) -> bool {
        self.provider.simulation().is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Customer Operations
    // ─────────────────────────────────────────────────────────────────────────────

    #[tracing::instrument(skip(self, params), fields(provider = %self.active_provider()))]
    pub async fn create_customer(
        &self,
        params: CreateCustomerParams,
        company_id: Option<&str>,
    ) -> Result<ProviderCustomer, PaymentError> {
        let request = request_json(&params);
        self.audited(
            "createCustomer",
            request,
            company_id,
            self.provider.create_customer(params),
        )
        .await
    }

    #[tracing::instrument(skip(self, cpf_cnpj), fields(provider = %self.active_provider()))]
    pub async fn get_customer_by_cpf_cnpj(
        &self,
        cpf_cnpj: &str,
        company_id: Option<&str>,
    ) -> Result<Option<ProviderCustomer>, PaymentError> {
        self.audited(
            "getCustomerByCpfCnpj",
            request_json(&json!({ "cpfCnpj": cpf_cnpj })),
            company_id,
            self.provider.get_customer_by_cpf_cnpj(cpf_cnpj),
        )
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment Operations
    // ─────────────────────────────────────────────────────────────────────────────

    #[tracing::instrument(
        skip(self, params),
        fields(provider = %self.active_provider(), billing_type = %params.billing_type)
    )]
    pub async fn create_payment(
        &self,
        params: CreatePaymentParams,
        company_id: Option<&str>,
    ) -> Result<ProviderPayment, PaymentError> {
        let request = request_json(&params);
        self.audited(
            "createPayment",
            request,
            company_id,
            self.provider.create_payment(params),
        )
        .await
    }

    #[tracing::instrument(skip(self), fields(provider = %self.active_provider()))]
    pub async fn get_payment(
        &self,
        payment_id: &str,
        company_id: Option<&str>,
    ) -> Result<ProviderPayment, PaymentError> {
        self.audited(
            "getPayment",
            json!({ "paymentId": payment_id }),
            company_id,
            self.provider.get_payment(payment_id),
        )
        .await
    }

    #[tracing::instrument(skip(self), fields(provider = %self.active_provider()))]
    pub async fn get_payment_by_external_reference(
        &self,
        external_reference: &str,
        company_id: Option<&str>,
    ) -> Result<Option<ProviderPayment>, PaymentError> {
        self.audited(
            "getPaymentByExternalReference",
            json!({ "externalReference": external_reference }),
            company_id,
            self.provider
                .get_payment_by_external_reference(external_reference),
        )
        .await
    }

    #[tracing::instrument(
        skip(self, params),
        fields(provider = %self.active_provider(), payment_id = %params.payment_id)
    )]
    pub async fn refund_payment(
        &self,
        params: RefundParams,
        company_id: Option<&str>,
    ) -> Result<ProviderPayment, PaymentError> {
        let request = request_json(&params);
        self.audited(
            "refundPayment",
            request,
            company_id,
            self.provider.refund_payment(params),
        )
        .await
    }

    #[tracing::instrument(skip(self), fields(provider = %self.active_provider()))]
    pub async fn cancel_payment(
        &self,
        payment_id: &str,
        company_id: Option<&str>,
    ) -> Result<(), PaymentError> {
        self.audited(
            "cancelPayment",
            json!({ "paymentId": payment_id }),
            company_id,
            self.provider.cancel_payment(payment_id),
        )
        .await
    }

    /// Drives a fabricated lifecycle event on a simulated backend.
    ///
    /// Fails with `Configuration` when the active provider settles on its own.
    #[tracing::instrument(skip(self), fields(provider = %self.active_provider()))]
    pub async fn simulate(
        &self,
        action: SimulationAction,
        payment_id: &str,
        company_id: Option<&str>,
    ) -> Result<ProviderPayment, PaymentError> {
        let simulation = self.provider.simulation().ok_or_else(|| {
            PaymentError::Configuration(format!(
                "Provider {} does not support simulation",
                self.active_provider()
            ))
        })?;

        let outcome = match action {
            SimulationAction::Confirm => simulation.simulate_confirmation(payment_id),
            SimulationAction::Receive => simulation.simulate_receipt(payment_id),
            SimulationAction::Overdue => simulation.simulate_overdue(payment_id),
            SimulationAction::Delete => simulation.simulate_deletion(payment_id),
        };

        self.audited(
            action.operation(),
            json!({ "paymentId": payment_id }),
            company_id,
            std::future::ready(outcome),
        )
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Webhooks
    // ─────────────────────────────────────────────────────────────────────────────

    /// Forwarded without auditing.
    pub fn parse_webhook(&self, body: &[u8]) -> Result<WebhookPayload, PaymentError> {
        self.provider.parse_webhook(body)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Auditing
    // ─────────────────────────────────────────────────────────────────────────────

    /// Awaits `call` and records exactly one log entry for it, whichever way
    /// it finishes.
    async fn audited<T, F>(
        &self,
        operation: &'static str,
        request_data: Value,
        company_id: Option<&str>,
        call: F,
    ) -> Result<T, PaymentError>
    where
        T: Serialize,
        F: Future<Output = Result<T, PaymentError>>,
    {
        let started = Instant::now();
        let result = call.await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let Some(repository) = &self.repository else {
            return result;
        };

        let (response_data, error_message) = match &result {
            Ok(response) => (
                serde_json::to_value(response)
                    .ok()
                    .filter(|value| !value.is_null())
                    .map(|value| sanitize_for_log(&value)),
                None,
            ),
            Err(err) => (None, Some(err.to_string())),
        };

        let entry = NewTransactionLog {
            provider: self.active_provider().to_string(),
            operation: operation.to_string(),
            request_data,
            response_data,
            error_message,
            company_id: company_id.map(str::to_string),
            duration_ms,
        };

        if let Err(err) = repository.log(entry).await {
            tracing::error!(operation, error = %err, "Failed to log transaction");
        }

        result
    }
}

/// Serializes a request for the audit trail with secrets and documents masked.
fn request_json<T: Serialize>(request: &T) -> Value {
    sanitize_for_log(&serde_json::to_value(request).unwrap_or_default())
}
