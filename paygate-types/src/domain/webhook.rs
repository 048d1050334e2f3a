use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical, provider-agnostic webhook event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookEventType {
    PaymentCreated,
    PaymentConfirmed,
    PaymentReceived,
    PaymentOverdue,
    PaymentRefunded,
    PaymentDeleted,
}

impl AsRef<str> for WebhookEventType {
    fn as_ref(&self) -> &str {
        match self {
            Self::PaymentCreated => "PAYMENT_CREATED",
            Self::PaymentConfirmed => "PAYMENT_CONFIRMED",
            Self::PaymentReceived => "PAYMENT_RECEIVED",
            Self::PaymentOverdue => "PAYMENT_OVERDUE",
            Self::PaymentRefunded => "PAYMENT_REFUNDED",
            Self::PaymentDeleted => "PAYMENT_DELETED",
        }
    }
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for WebhookEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAYMENT_CREATED" => Ok(Self::PaymentCreated),
            "PAYMENT_CONFIRMED" => Ok(Self::PaymentConfirmed),
            "PAYMENT_RECEIVED" => Ok(Self::PaymentReceived),
            "PAYMENT_OVERDUE" => Ok(Self::PaymentOverdue),
            "PAYMENT_REFUNDED" => Ok(Self::PaymentRefunded),
            "PAYMENT_DELETED" => Ok(Self::PaymentDeleted),
            _ => Err(format!("Unknown webhook event: {}", s)),
        }
    }
}

/// Payment section of a parsed notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayment {
    pub id: String,
    pub customer: String,
    pub value: Decimal,
    /// Provider status as sent on the wire
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A provider notification projected onto the canonical shape.
///
/// Produced per delivery and never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub event: WebhookEventType,
    pub payment: WebhookPayment,
}
