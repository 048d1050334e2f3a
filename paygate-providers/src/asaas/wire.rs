//! Asaas REST response bodies.

use chrono::NaiveDate;
use paygate_types::{BillingType, ProviderCustomer, ProviderPayment};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status::map_asaas_status;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AsaasCustomer {
    pub id: String,
    pub name: String,
    pub cpf_cnpj: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile_phone: Option<String>,
}

impl From<AsaasCustomer> for ProviderCustomer {
    fn from(c: AsaasCustomer) -> Self {
        ProviderCustomer {
            id: c.id,
            name: c.name,
            cpf_cnpj: c.cpf_cnpj,
            email: c.email,
            phone: c.phone,
            mobile_phone: c.mobile_phone,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AsaasPayment {
    pub id: String,
    pub customer: String,
    pub billing_type: String,
    pub value: Decimal,
    pub due_date: NaiveDate,
    pub description: Option<String>,
    pub external_reference: Option<String>,
    pub installment_count: Option<u32>,
    pub installment_value: Option<Decimal>,
    pub invoice_url: Option<String>,
    pub bank_slip_url: Option<String>,
    pub transaction_receipt_url: Option<String>,
    pub pix_qr_code_url: Option<String>,
    pub status: String,
}

impl From<AsaasPayment> for ProviderPayment {
    fn from(p: AsaasPayment) -> Self {
        ProviderPayment {
            id: p.id,
            customer_id: p.customer,
            // Asaas has more instruments than we model; treat them as payer's choice
            billing_type: p.billing_type.parse().unwrap_or(BillingType::Undefined),
            value: p.value,
            due_date: p.due_date,
            description: p.description,
            external_reference: p.external_reference,
            installment_count: p.installment_count,
            installment_value: p.installment_value,
            status: map_asaas_status(&p.status),
            payment_url: p.invoice_url,
            boleto_url: p.bank_slip_url,
            pix_qr_code_url: p.pix_qr_code_url,
            transaction_receipt_url: p.transaction_receipt_url,
        }
    }
}

/// Paginated list envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct AsaasList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AsaasErrorBody {
    #[serde(default)]
    pub errors: Vec<AsaasErrorItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AsaasErrorItem {
    pub description: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AsaasRefundRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AsaasDeleted {
    #[serde(default)]
    pub deleted: bool,
}
