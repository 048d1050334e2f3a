//! # Paygate Client SDK
//!
//! A typed Rust client for the payment gateway HTTP API.

use paygate_types::{
    CreateCustomerParams, CreatePaymentParams, ProviderCustomer, ProviderPayment, TransactionLog,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        /// Machine-readable code from the error body, when present
        code: Option<String>,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// The API's error code, e.g. `PAYMENT_NOT_FOUND`.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Acknowledgement returned for an accepted webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub received: bool,
    pub event: String,
    pub payment_id: String,
}

/// Filter for the audit-log listing. Entries are always scoped to the
/// client's tenant.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub provider: Option<String>,
    pub limit: Option<usize>,
}

/// Payment gateway API client.
pub struct PaygateClient {
    base_url: String,
    company_id: Option<String>,
    http: Client,
}

impl PaygateClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            company_id: None,
            http: Client::new(),
        }
    }

    /// Sets the tenant sent as `X-Company-Id` on every request.
    pub fn with_company_id(mut self, company_id: impl Into<String>) -> Self {
        self.company_id = Some(company_id.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Customers
    // ─────────────────────────────────────────────────────────────────────────

    /// Registers a customer, or returns the one already holding the document.
    pub async fn create_customer(
        &self,
        params: &CreateCustomerParams,
    ) -> Result<ProviderCustomer, ClientError> {
        self.send(self.request(reqwest::Method::POST, "/api/customers").json(params))
            .await
    }

    pub async fn find_customer(
        &self,
        cpf_cnpj: &str,
    ) -> Result<Option<ProviderCustomer>, ClientError> {
        let req = self
            .request(reqwest::Method::GET, "/api/customers")
            .query(&[("cpfCnpj", cpf_cnpj)]);
        not_found_as_none(self.send(req).await)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payments
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn create_payment(
        &self,
        params: &CreatePaymentParams,
    ) -> Result<ProviderPayment, ClientError> {
        self.send(self.request(reqwest::Method::POST, "/api/payments").json(params))
            .await
    }

    pub async fn get_payment(&self, id: &str) -> Result<ProviderPayment, ClientError> {
        self.send(self.request(reqwest::Method::GET, &format!("/api/payments/{}", id)))
            .await
    }

    pub async fn find_payment(
        &self,
        external_reference: &str,
    ) -> Result<Option<ProviderPayment>, ClientError> {
        let req = self
            .request(reqwest::Method::GET, "/api/payments")
            .query(&[("externalReference", external_reference)]);
        not_found_as_none(self.send(req).await)
    }

    /// Refunds a payment; the full amount when `value` is `None`.
    pub async fn refund_payment(
        &self,
        id: &str,
        value: Option<Decimal>,
        description: Option<&str>,
    ) -> Result<ProviderPayment, ClientError> {
        let body = json!({ "value": value, "description": description });
        self.send(
            self.request(reqwest::Method::POST, &format!("/api/payments/{}/refund", id))
                .json(&body),
        )
        .await
    }

    pub async fn cancel_payment(&self, id: &str) -> Result<(), ClientError> {
        let resp = self
            .request(reqwest::Method::POST, &format!("/api/payments/{}/cancel", id))
            .send()
            .await?;
        if resp.status().is_success() {
            return Ok(());
        }
        Err(api_error(resp).await)
    }

    /// Drives a simulated lifecycle event (`confirm`, `receive`, `overdue`,
    /// `delete`). Only available when the server runs the custom gateway.
    pub async fn simulate(&self, id: &str, action: &str) -> Result<ProviderPayment, ClientError> {
        self.send(self.request(
            reqwest::Method::POST,
            &format!("/api/payments/{}/simulate/{}", id, action),
        ))
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Webhooks & audit log
    // ─────────────────────────────────────────────────────────────────────────

    /// Delivers a raw notification, as the provider would.
    pub async fn send_webhook(
        &self,
        body: &serde_json::Value,
        token: Option<&str>,
    ) -> Result<WebhookAck, ClientError> {
        let mut req = self.request(reqwest::Method::POST, "/api/webhooks").json(body);
        if let Some(token) = token {
            req = req.header("asaas-access-token", token);
        }
        self.send(req).await
    }

    pub async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionLog>, ClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(provider) = &filter.provider {
            query.push(("provider", provider.clone()));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit", limit.to_string()));
        }
        self.send(
            self.request(reqwest::Method::GET, "/api/transactions")
                .query(&query),
        )
        .await
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(company_id) = &self.company_id {
            req = req.header("X-Company-Id", company_id);
        }
        req
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        if resp.status().is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(api_error(resp).await)
        }
    }
}

async fn api_error(resp: reqwest::Response) -> ClientError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<serde_json::Value>(&body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(String::from)
    };

    ClientError::Api {
        status: status.as_u16(),
        code: field("code"),
        message: field("error").unwrap_or(body),
    }
}

fn not_found_as_none<T>(result: Result<T, ClientError>) -> Result<Option<T>, ClientError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ClientError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
