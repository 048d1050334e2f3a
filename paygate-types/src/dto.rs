//! Data Transfer Objects (DTOs) for provider requests.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::BillingType;

// ─────────────────────────────────────────────────────────────────────────────
// Customer DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to register a customer with the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerParams {
    pub name: String,
    /// CPF or CNPJ, formatted or digits only
    pub cpf_cnpj: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_number: Option<String>,
}

impl CreateCustomerParams {
    /// Minimal request with only the mandatory fields.
    pub fn new(name: impl Into<String>, cpf_cnpj: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cpf_cnpj: cpf_cnpj.into(),
            email: None,
            phone: None,
            mobile_phone: None,
            postal_code: None,
            address: None,
            address_number: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a charge for an existing customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentParams {
    /// Provider customer id
    pub customer: String,
    pub billing_type: BillingType,
    pub value: Decimal,
    pub due_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_value: Option<Decimal>,
}

impl CreatePaymentParams {
    /// Minimal request with only the mandatory fields.
    pub fn new(
        customer: impl Into<String>,
        billing_type: BillingType,
        value: Decimal,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            customer: customer.into(),
            billing_type,
            value,
            due_date,
            description: None,
            external_reference: None,
            installment_count: None,
            installment_value: None,
        }
    }

    pub fn with_external_reference(mut self, reference: impl Into<String>) -> Self {
        self.external_reference = Some(reference.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Request to refund a payment, fully or partially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundParams {
    pub payment_id: String,
    /// Partial amount; full refund when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RefundParams {
    pub fn full(payment_id: impl Into<String>) -> Self {
        Self {
            payment_id: payment_id.into(),
            value: None,
            description: None,
        }
    }
}
