//! Payment domain model and status lifecycle.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The settlement instrument requested for a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingType {
    Boleto,
    CreditCard,
    Pix,
    /// Let the payer choose; both boleto and PIX artifacts are produced.
    Undefined,
}

impl BillingType {
    /// Whether a boleto (bank slip) must be issued for this billing type.
    pub fn issues_boleto(self) -> bool {
        matches!(self, Self::Boleto | Self::Undefined)
    }

    /// Whether a PIX QR code must be issued for this billing type.
    pub fn issues_pix(self) -> bool {
        matches!(self, Self::Pix | Self::Undefined)
    }
}

impl AsRef<str> for BillingType {
    fn as_ref(&self) -> &str {
        match self {
            Self::Boleto => "BOLETO",
            Self::CreditCard => "CREDIT_CARD",
            Self::Pix => "PIX",
            Self::Undefined => "UNDEFINED",
        }
    }
}

impl std::fmt::Display for BillingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for BillingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BOLETO" => Ok(Self::Boleto),
            "CREDIT_CARD" => Ok(Self::CreditCard),
            "PIX" => Ok(Self::Pix),
            "UNDEFINED" => Ok(Self::Undefined),
            _ => Err(format!("Unknown billing type: {}", s)),
        }
    }
}

/// Lifecycle state of a payment.
///
/// ```text
/// pending ──► confirmed ──► received
///    │  ╲          ▲            │
///    │   ╲─► overdue ─┘         │
///    └──────────┴───────────────┴──► refunded | cancelled | deleted
/// ```
///
/// Nothing ever returns to `pending`; `refunded`, `cancelled` and `deleted`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Confirmed,
    Received,
    Overdue,
    Refunded,
    Cancelled,
    Deleted,
}

impl PaymentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Refunded | Self::Cancelled | Self::Deleted)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;

        if self.is_terminal() {
            return false;
        }

        match next {
            Pending => false,
            Refunded | Cancelled | Deleted => true,
            Confirmed => matches!(self, Pending | Overdue),
            Received => matches!(self, Pending | Overdue | Confirmed),
            Overdue => self == Pending,
        }
    }
}

impl AsRef<str> for PaymentStatus {
    fn as_ref(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Received => "received",
            Self::Overdue => "overdue",
            Self::Refunded => "refunded",
            Self::Cancelled => "cancelled",
            Self::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// One charge instance tied to a customer.
///
/// Only provider-internal lifecycle events mutate a payment; callers never
/// set `status` directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPayment {
    pub id: String,
    pub customer_id: String,
    pub billing_type: BillingType,
    /// Amount in BRL
    pub value: Decimal,
    pub due_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Caller-supplied foreign key (e.g. an agreement id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_value: Option<Decimal>,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boleto_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix_qr_code_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_receipt_url: Option<String>,
}
