//! Error types for the payment gateway abstraction.

use crate::domain::PaymentStatus;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by payment providers and the layers wrapping them.
///
/// Every variant carries a stable machine-readable code (see [`PaymentError::code`]).
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Upstream transport or authentication failure.
    #[error("Payment provider \"{provider}\" is unavailable: {source}")]
    ProviderUnavailable {
        provider: String,
        #[source]
        source: BoxError,
    },

    /// A lookup by an explicit id found nothing.
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    #[error(
        "Custom gateway cannot be used in production mode. Set CUSTOM_GATEWAY_MODE=test or use a different provider."
    )]
    CustomGatewayProductionBlocked,

    /// The inbound notification body is structurally invalid.
    #[error("Invalid {provider} webhook payload: {reason}")]
    InvalidWebhook { provider: String, reason: String },

    /// The provider answered, but refused the request.
    #[error("Payment provider \"{provider}\" rejected the request ({status}): {message}")]
    Rejected {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payment {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl PaymentError {
    /// Wraps an upstream failure for the named provider.
    pub fn unavailable(
        provider: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            source: source.into(),
        }
    }

    /// Builds a structural webhook error for the named provider.
    pub fn invalid_webhook(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidWebhook {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable { .. } => "PROVIDER_UNAVAILABLE",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::CustomGatewayProductionBlocked => "CUSTOM_GATEWAY_PRODUCTION_BLOCKED",
            Self::InvalidWebhook { .. } => "INVALID_WEBHOOK",
            Self::Rejected { .. } => "PROVIDER_REJECTED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// Audit-log repository errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {message}")]
    BadRequest { message: String, code: &'static str },

    #[error("Not found: {message}")]
    NotFound { message: String, code: &'static str },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {message}")]
    Conflict { message: String, code: &'static str },

    #[error("Upstream error: {message}")]
    BadGateway { message: String, code: &'static str },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "BAD_REQUEST",
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "NOT_FOUND",
        }
    }

    /// Machine-readable code carried in the error body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest { code, .. }
            | Self::NotFound { code, .. }
            | Self::Conflict { code, .. }
            | Self::BadGateway { code, .. } => *code,
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        let code = err.code();
        let message = err.to_string();
        match err {
            PaymentError::PaymentNotFound(_) => AppError::NotFound { message, code },
            PaymentError::InvalidWebhook { .. } | PaymentError::Validation(_) => {
                AppError::BadRequest { message, code }
            }
            PaymentError::InvalidTransition { .. } => AppError::Conflict { message, code },
            PaymentError::ProviderUnavailable { .. } | PaymentError::Rejected { .. } => {
                AppError::BadGateway { message, code }
            }
            PaymentError::CustomGatewayProductionBlocked | PaymentError::Configuration(_) => {
                AppError::Internal(message)
            }
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            PaymentError::PaymentNotFound("pay_1".into()).code(),
            "PAYMENT_NOT_FOUND"
        );
        assert_eq!(
            PaymentError::CustomGatewayProductionBlocked.code(),
            "CUSTOM_GATEWAY_PRODUCTION_BLOCKED"
        );
        assert_eq!(
            PaymentError::unavailable("asaas", "connection refused").code(),
            "PROVIDER_UNAVAILABLE"
        );
    }

    #[test]
    fn test_unavailable_message_includes_cause() {
        let err = PaymentError::unavailable("asaas", "connection refused");
        assert_eq!(
            err.to_string(),
            "Payment provider \"asaas\" is unavailable: connection refused"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_app_error_mapping_keeps_payment_code() {
        let app: AppError = PaymentError::PaymentNotFound("pay_1".into()).into();
        assert!(matches!(app, AppError::NotFound { .. }));
        assert_eq!(app.code(), "PAYMENT_NOT_FOUND");

        let app: AppError = PaymentError::invalid_webhook("custom", "missing payment.id").into();
        assert!(matches!(app, AppError::BadRequest { .. }));
        assert_eq!(app.code(), "INVALID_WEBHOOK");
    }

    #[test]
    fn test_repo_error_maps_to_internal() {
        let app: AppError = RepoError::Unavailable("audit store offline".into()).into();

        assert!(matches!(app, AppError::Internal(ref m) if m.contains("audit store offline")));
    }
}
