//! Payment provider port.
//!
//! Every backend processor (live gateway or simulator) implements this trait.
//! Callers hold an `Arc<dyn PaymentProvider>` and never see the concrete type.

use crate::domain::{ProviderCustomer, ProviderPayment, WebhookPayload};
use crate::dto::{CreateCustomerParams, CreatePaymentParams, RefundParams};
use crate::error::PaymentError;

/// Capability interface of a payment processor.
///
/// Lookups that search (`get_customer_by_cpf_cnpj`,
/// `get_payment_by_external_reference`) return `Ok(None)` when nothing matches.
/// Operations addressed by an explicit payment id fail with
/// [`PaymentError::PaymentNotFound`] instead.
#[async_trait::async_trait]
pub trait PaymentProvider: Send + Sync + 'static {
    /// Identifies the active implementation (`asaas`, `custom`).
    fn name(&self) -> &str;

    /// Registers a customer. Re-registering a known document returns the existing customer.
    async fn create_customer(
        &self,
        params: CreateCustomerParams,
    ) -> Result<ProviderCustomer, PaymentError>;

    async fn get_customer_by_cpf_cnpj(
        &self,
        cpf_cnpj: &str,
    ) -> Result<Option<ProviderCustomer>, PaymentError>;

    async fn create_payment(
        &self,
        params: CreatePaymentParams,
    ) -> Result<ProviderPayment, PaymentError>;

    async fn get_payment(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError>;

    async fn get_payment_by_external_reference(
        &self,
        external_reference: &str,
    ) -> Result<Option<ProviderPayment>, PaymentError>;

    async fn refund_payment(&self, params: RefundParams) -> Result<ProviderPayment, PaymentError>;

    async fn cancel_payment(&self, payment_id: &str) -> Result<(), PaymentError>;

    /// Parses a raw notification body into the canonical shape.
    ///
    /// Fails fast on structurally invalid bodies (e.g. a missing `payment.id`).
    fn parse_webhook(&self, body: &[u8]) -> Result<WebhookPayload, PaymentError>;

    /// Test-mode lifecycle controls, when the backend supports them.
    fn simulation(&self) -> Option<&dyn PaymentSimulation> {
        None
    }
}

/// Drives fabricated settlement events on a simulated backend.
///
/// Only simulator-backed providers expose this; a live gateway settles on its own.
pub trait PaymentSimulation: Send + Sync {
    fn simulate_confirmation(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError>;

    fn simulate_receipt(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError>;

    fn simulate_overdue(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError>;

    fn simulate_deletion(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError>;
}
