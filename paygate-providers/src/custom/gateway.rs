use async_trait::async_trait;
use tracing::{info, instrument};

use paygate_types::{
    CreateCustomerParams, CreatePaymentParams, GatewayMode, PaymentError, PaymentProvider,
    PaymentSimulation, ProviderCustomer, ProviderPayment, RefundParams, WebhookEventType,
    WebhookPayload, mask_document,
};

use super::TestModeSimulator;
use crate::notification::read_notification;

const NAME: &str = "custom";

/// Payment provider backed entirely by [`TestModeSimulator`].
///
/// Nothing here moves money, so the gateway refuses to exist in production.
pub struct CustomGateway {
    simulator: TestModeSimulator,
}

impl CustomGateway {
    /// Creates a gateway in the given mode.
    ///
    /// `GatewayMode::Production` fails with
    /// [`PaymentError::CustomGatewayProductionBlocked`] before any state is allocated.
    pub fn new(mode: GatewayMode) -> Result<Self, PaymentError> {
        if mode == GatewayMode::Production {
            return Err(PaymentError::CustomGatewayProductionBlocked);
        }

        info!("Custom payment gateway running in test mode");
        Ok(Self {
            simulator: TestModeSimulator::new(),
        })
    }

    pub fn simulator(&self) -> &TestModeSimulator {
        &self.simulator
    }
}

#[async_trait]
impl PaymentProvider for CustomGateway {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self, params), fields(cpf_cnpj = %mask_document(&params.cpf_cnpj)))]
    async fn create_customer(
        &self,
        params: CreateCustomerParams,
    ) -> Result<ProviderCustomer, PaymentError> {
        self.simulator.create_customer(params)
    }

    async fn get_customer_by_cpf_cnpj(
        &self,
        cpf_cnpj: &str,
    ) -> Result<Option<ProviderCustomer>, PaymentError> {
        Ok(self.simulator.customer_by_document(cpf_cnpj))
    }

    #[instrument(skip(self, params), fields(customer = %params.customer))]
    async fn create_payment(
        &self,
        params: CreatePaymentParams,
    ) -> Result<ProviderPayment, PaymentError> {
        self.simulator.create_payment(params)
    }

    async fn get_payment(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError> {
        self.simulator
            .payment(payment_id)
            .ok_or_else(|| PaymentError::PaymentNotFound(payment_id.to_string()))
    }

    async fn get_payment_by_external_reference(
        &self,
        external_reference: &str,
    ) -> Result<Option<ProviderPayment>, PaymentError> {
        Ok(self
            .simulator
            .payment_by_external_reference(external_reference))
    }

    #[instrument(skip(self, params), fields(payment_id = %params.payment_id))]
    async fn refund_payment(&self, params: RefundParams) -> Result<ProviderPayment, PaymentError> {
        self.simulator.refund(&params.payment_id, params.value)
    }

    #[instrument(skip(self))]
    async fn cancel_payment(&self, payment_id: &str) -> Result<(), PaymentError> {
        self.simulator.cancel(payment_id).map(|_| ())
    }

    fn parse_webhook(&self, body: &[u8]) -> Result<WebhookPayload, PaymentError> {
        let raw = read_notification(NAME, body)?;
        let event = raw
            .event
            .parse::<WebhookEventType>()
            .map_err(|reason| PaymentError::invalid_webhook(NAME, reason))?;

        Ok(WebhookPayload {
            event,
            payment: raw.payment,
        })
    }

    fn simulation(&self) -> Option<&dyn PaymentSimulation> {
        Some(self)
    }
}

impl PaymentSimulation for CustomGateway {
    fn simulate_confirmation(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError> {
        self.simulator.confirm(payment_id)
    }

    fn simulate_receipt(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError> {
        self.simulator.receive(payment_id)
    }

    fn simulate_overdue(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError> {
        self.simulator.mark_overdue(payment_id)
    }

    fn simulate_deletion(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError> {
        self.simulator.delete(payment_id)
    }
}
