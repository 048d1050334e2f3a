//! Asaas REST adapter.
//!
//! Translates `PaymentProvider` calls into authenticated requests against
//! the Asaas v3 API and maps its schema back onto the domain types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use paygate_types::config::AsaasConfig;
use paygate_types::{
    CreateCustomerParams, CreatePaymentParams, PaymentError, PaymentProvider, ProviderCustomer,
    ProviderPayment, RefundParams, WebhookPayload, mask_document, normalize_document,
};

use super::status::map_asaas_event;
use super::wire::{
    AsaasCustomer, AsaasDeleted, AsaasErrorBody, AsaasList, AsaasPayment, AsaasRefundRequest,
};
use crate::notification::read_notification;

const NAME: &str = "asaas";

/// Live-gateway adapter for Asaas.
///
/// Construction never touches the network. A missing API key surfaces as
/// [`PaymentError::ProviderUnavailable`] on the first call.
pub struct AsaasAdapter {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl AsaasAdapter {
    /// Creates an adapter from the Asaas section of the configuration.
    pub fn new(config: &AsaasConfig) -> Result<Self, PaymentError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PaymentError::unavailable(NAME, e))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn api_key(&self) -> Result<&str, PaymentError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| PaymentError::unavailable(NAME, "ASAAS_API_KEY is not configured"))
    }

    /// Sends an authenticated request and decodes a successful JSON body.
    ///
    /// Transport failures become `ProviderUnavailable`; non-2xx answers become
    /// `Rejected` carrying the first error description Asaas returned.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, PaymentError> {
        let response = request
            .header("access_token", self.api_key()?)
            .send()
            .await
            .map_err(|e| PaymentError::unavailable(NAME, e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(PaymentError::unavailable(NAME, "API key was rejected"));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PaymentError::unavailable(NAME, e))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<AsaasErrorBody>(&body)
                .ok()
                .and_then(|b| b.errors.into_iter().next())
                .map(|e| e.description)
                .unwrap_or_else(|| "Asaas API error".to_string());
            warn!(status = status.as_u16(), %message, "Asaas API error");
            return Err(PaymentError::Rejected {
                provider: NAME.into(),
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| PaymentError::Rejected {
            provider: NAME.into(),
            status: status.as_u16(),
            message: format!("unexpected response body: {e}"),
        })
    }
}

/// Turns a 404 on an id-addressed call into `PaymentNotFound`.
fn not_found_as(payment_id: &str, err: PaymentError) -> PaymentError {
    match err {
        PaymentError::Rejected { status: 404, .. } => {
            PaymentError::PaymentNotFound(payment_id.to_string())
        }
        other => other,
    }
}

#[async_trait]
impl PaymentProvider for AsaasAdapter {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self, params), fields(cpf_cnpj = %mask_document(&params.cpf_cnpj)))]
    async fn create_customer(
        &self,
        params: CreateCustomerParams,
    ) -> Result<ProviderCustomer, PaymentError> {
        let document = normalize_document(&params.cpf_cnpj);
        if document.is_empty() {
            return Err(PaymentError::Validation(
                "cpfCnpj must contain digits".to_string(),
            ));
        }

        // Asaas does not dedupe by document itself
        if let Some(existing) = self.get_customer_by_cpf_cnpj(&document).await? {
            debug!(customer_id = %existing.id, "Asaas customer already registered");
            return Ok(existing);
        }

        debug!("Creating Asaas customer");
        let params = CreateCustomerParams {
            cpf_cnpj: document,
            ..params
        };
        let customer: AsaasCustomer = self
            .send(self.http.post(self.url("/customers")).json(&params))
            .await?;
        Ok(customer.into())
    }

    #[instrument(skip(self, cpf_cnpj), fields(cpf_cnpj = %mask_document(cpf_cnpj)))]
    async fn get_customer_by_cpf_cnpj(
        &self,
        cpf_cnpj: &str,
    ) -> Result<Option<ProviderCustomer>, PaymentError> {
        let list: AsaasList<AsaasCustomer> = self
            .send(
                self.http
                    .get(self.url("/customers"))
                    .query(&[("cpfCnpj", normalize_document(cpf_cnpj))]),
            )
            .await?;
        Ok(list.data.into_iter().next().map(Into::into))
    }

    #[instrument(skip(self, params), fields(customer = %params.customer, billing_type = %params.billing_type))]
    async fn create_payment(
        &self,
        params: CreatePaymentParams,
    ) -> Result<ProviderPayment, PaymentError> {
        let payment: AsaasPayment = self
            .send(self.http.post(self.url("/payments")).json(&params))
            .await?;
        Ok(payment.into())
    }

    #[instrument(skip(self))]
    async fn get_payment(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError> {
        let payment: AsaasPayment = self
            .send(self.http.get(self.url(&format!("/payments/{payment_id}"))))
            .await
            .map_err(|e| not_found_as(payment_id, e))?;
        Ok(payment.into())
    }

    #[instrument(skip(self))]
    async fn get_payment_by_external_reference(
        &self,
        external_reference: &str,
    ) -> Result<Option<ProviderPayment>, PaymentError> {
        let list: AsaasList<AsaasPayment> = self
            .send(
                self.http
                    .get(self.url("/payments"))
                    .query(&[("externalReference", external_reference)]),
            )
            .await?;
        Ok(list.data.into_iter().next().map(Into::into))
    }

    #[instrument(skip(self, params), fields(payment_id = %params.payment_id))]
    async fn refund_payment(&self, params: RefundParams) -> Result<ProviderPayment, PaymentError> {
        let body = AsaasRefundRequest {
            value: params.value,
            description: params.description,
        };
        let payment: AsaasPayment = self
            .send(
                self.http
                    .post(self.url(&format!("/payments/{}/refund", params.payment_id)))
                    .json(&body),
            )
            .await
            .map_err(|e| not_found_as(&params.payment_id, e))?;
        Ok(payment.into())
    }

    #[instrument(skip(self))]
    async fn cancel_payment(&self, payment_id: &str) -> Result<(), PaymentError> {
        let deleted: AsaasDeleted = self
            .send(self.http.delete(self.url(&format!("/payments/{payment_id}"))))
            .await
            .map_err(|e| not_found_as(payment_id, e))?;

        if !deleted.deleted {
            return Err(PaymentError::Rejected {
                provider: NAME.into(),
                status: 200,
                message: format!("payment {payment_id} was not deleted"),
            });
        }
        Ok(())
    }

    fn parse_webhook(&self, body: &[u8]) -> Result<WebhookPayload, PaymentError> {
        let raw = read_notification(NAME, body)?;
        Ok(WebhookPayload {
            event: map_asaas_event(&raw.event),
            payment: raw.payment,
        })
    }
}
