//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use paygate_types::{
    AppError, CreateCustomerParams, CreatePaymentParams, PaymentError, RefundParams, RepoError,
};

use crate::security::verify_webhook_token;
use crate::{PaymentService, SimulationAction, WebhookService};

/// Header carrying the calling tenant.
pub const COMPANY_ID_HEADER: &str = "x-company-id";
/// Header Asaas uses to deliver the shared webhook token.
pub const WEBHOOK_TOKEN_HEADER: &str = "asaas-access-token";

/// Application state shared across handlers.
pub struct AppState {
    pub service: PaymentService,
    pub webhooks: WebhookService,
    /// Expected webhook token; deliveries are not authenticated when unset.
    pub webhook_token: Option<String>,
}

impl AppState {
    pub fn new(service: PaymentService) -> Self {
        let webhooks = WebhookService::new(Arc::clone(service.provider()));
        Self {
            service,
            webhooks,
            webhook_token: None,
        }
    }

    pub fn with_webhook_token(mut self, token: Option<String>) -> Self {
        self.webhook_token = token.filter(|t| !t.is_empty());
        self
    }
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        ApiError(err.into())
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "code": self.0.code()
        });

        (status, Json(body)).into_response()
    }
}

fn company_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(COMPANY_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "provider": state.service.active_provider()
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Customers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerQuery {
    pub cpf_cnpj: String,
}

#[tracing::instrument(skip(state, headers, req))]
pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateCustomerParams>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() {
        return Err(AppError::bad_request("Customer name cannot be empty").into());
    }

    let customer = state
        .service
        .create_customer(req, company_id(&headers).as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

#[tracing::instrument(skip(state, headers, query))]
pub async fn find_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CustomerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = state
        .service
        .get_customer_by_cpf_cnpj(&query.cpf_cnpj, company_id(&headers).as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound {
            message: "No customer registered for this document".into(),
            code: "CUSTOMER_NOT_FOUND",
        })?;
    Ok(Json(customer))
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuery {
    pub external_reference: String,
}

/// Refund request body; the payment id comes from the path.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RefundBody {
    #[serde(default)]
    pub value: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

#[tracing::instrument(skip(state, headers, req), fields(billing_type = %req.billing_type))]
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreatePaymentParams>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state
        .service
        .create_payment(req, company_id(&headers).as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[tracing::instrument(skip(state, headers), fields(payment_id = %id))]
pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state
        .service
        .get_payment(&id, company_id(&headers).as_deref())
        .await?;
    Ok(Json(payment))
}

#[tracing::instrument(skip(state, headers), fields(external_reference = %query.external_reference))]
pub async fn find_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<PaymentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state
        .service
        .get_payment_by_external_reference(
            &query.external_reference,
            company_id(&headers).as_deref(),
        )
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "No payment with external reference {}",
                query.external_reference
            ))
        })?;
    Ok(Json(payment))
}

#[tracing::instrument(skip(state, headers, body), fields(payment_id = %id))]
pub async fn refund_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<RefundBody>,
) -> Result<impl IntoResponse, ApiError> {
    let params = RefundParams {
        payment_id: id,
        value: body.value,
        description: body.description,
    };
    let payment = state
        .service
        .refund_payment(params, company_id(&headers).as_deref())
        .await?;
    Ok(Json(payment))
}

#[tracing::instrument(skip(state, headers), fields(payment_id = %id))]
pub async fn cancel_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .cancel_payment(&id, company_id(&headers).as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fabricates a lifecycle event on a simulated backend.
#[tracing::instrument(skip(state, headers), fields(payment_id = %id, action = %action))]
pub async fn simulate_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, action)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.service.supports_simulation() {
        return Err(AppError::NotFound {
            message: format!(
                "Provider {} does not support simulation",
                state.service.active_provider()
            ),
            code: "SIMULATION_UNAVAILABLE",
        }
        .into());
    }

    let action: SimulationAction = action.parse().map_err(AppError::bad_request)?;
    let payment = state
        .service
        .simulate(action, &id, company_id(&headers).as_deref())
        .await?;
    Ok(Json(payment))
}

// ─────────────────────────────────────────────────────────────────────────────
// Webhooks
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub received: bool,
    pub event: String,
    pub payment_id: String,
}

/// Receives a provider notification.
#[tracing::instrument(skip(state, headers, body))]
pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(expected) = &state.webhook_token {
        let presented = headers
            .get(WEBHOOK_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default();

        if !verify_webhook_token(presented, expected) {
            tracing::warn!("Webhook rejected: invalid access token");
            return Err(AppError::Unauthorized("Invalid webhook token".into()).into());
        }
    }

    let payload = state.webhooks.parse_webhook(&body)?;

    Ok(Json(WebhookAck {
        received: true,
        event: payload.event.to_string(),
        payment_id: payload.payment.id,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Audit log
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub provider: Option<String>,
    pub limit: Option<usize>,
}

/// Lists the calling tenant's audit-log entries, optionally narrowed to one
/// provider.
///
/// The tenant always comes from the `X-Company-Id` header; entries of other
/// tenants are never returned.
#[tracing::instrument(skip(state, headers))]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TransactionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repository = state.service.repository().ok_or_else(|| AppError::NotFound {
        message: "Transaction log is not configured".into(),
        code: "AUDIT_LOG_DISABLED",
    })?;

    let tenant = company_id(&headers)
        .ok_or_else(|| AppError::bad_request("The X-Company-Id header is required"))?;

    let logs = match query.provider {
        Some(provider) => {
            repository
                .get_by_company_and_provider(&tenant, &provider, query.limit)
                .await?
        }
        None => repository.get_by_company_id(&tenant, query.limit).await?,
    };

    Ok(Json(logs))
}
