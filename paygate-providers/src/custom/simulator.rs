//! In-memory payment simulator backing the custom gateway.
//!
//! State lives in `DashMap`s so concurrent callers never block on a single
//! lock; every mutation of one payment happens under that entry's guard.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use paygate_types::{
    CreateCustomerParams, CreatePaymentParams, PaymentError, PaymentStatus,
    ProviderCustomer, ProviderPayment, normalize_document,
};

const CUSTOMER_PREFIX: &str = "test_cus_";
const PAYMENT_PREFIX: &str = "test_pay_";
const BASE_URL: &str = "https://test-gateway.local";

fn short_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &hex[..12])
}

fn artifact_url(kind: &str, payment_id: &str) -> String {
    format!("{BASE_URL}/{kind}/{payment_id}")
}

/// Fabricates customers and payments and lets callers drive their lifecycle.
#[derive(Default)]
pub struct TestModeSimulator {
    customers: DashMap<String, ProviderCustomer>,
    /// normalized document -> customer id
    customers_by_document: DashMap<String, String>,
    payments: DashMap<String, ProviderPayment>,
    /// external reference -> payment id (latest wins)
    payments_by_external_ref: DashMap<String, String>,
}

impl TestModeSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Customers
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers a customer, returning the existing one for a known document.
    pub fn create_customer(
        &self,
        params: CreateCustomerParams,
    ) -> Result<ProviderCustomer, PaymentError> {
        let document = normalize_document(&params.cpf_cnpj);
        if document.is_empty() {
            return Err(PaymentError::Validation(
                "cpfCnpj must contain digits".into(),
            ));
        }

        match self.customers_by_document.entry(document.clone()) {
            Entry::Occupied(existing) => self
                .customers
                .get(existing.get())
                .map(|c| c.value().clone())
                .ok_or_else(|| PaymentError::Validation("customer index is inconsistent".into())),
            Entry::Vacant(slot) => {
                let customer = ProviderCustomer {
                    id: short_id(CUSTOMER_PREFIX),
                    name: params.name,
                    cpf_cnpj: document,
                    email: params.email,
                    phone: params.phone,
                    mobile_phone: params.mobile_phone,
                };
                debug!(customer_id = %customer.id, "Simulated customer created");
                self.customers
                    .insert(customer.id.clone(), customer.clone());
                slot.insert(customer.id.clone());
                Ok(customer)
            }
        }
    }

    pub fn customer_by_document(&self, cpf_cnpj: &str) -> Option<ProviderCustomer> {
        let id = self
            .customers_by_document
            .get(&normalize_document(cpf_cnpj))?
            .value()
            .clone();
        self.customers.get(&id).map(|c| c.value().clone())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payments
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn create_payment(
        &self,
        params: CreatePaymentParams,
    ) -> Result<ProviderPayment, PaymentError> {
        if !self.customers.contains_key(&params.customer) {
            return Err(PaymentError::Validation(format!(
                "Unknown customer: {}",
                params.customer
            )));
        }
        if params.value <= Decimal::ZERO {
            return Err(PaymentError::Validation(
                "Payment value must be positive".into(),
            ));
        }

        let id = short_id(PAYMENT_PREFIX);
        let payment = ProviderPayment {
            payment_url: Some(artifact_url("pay", &id)),
            boleto_url: params
                .billing_type
                .issues_boleto()
                .then(|| artifact_url("boleto", &id)),
            pix_qr_code_url: params
                .billing_type
                .issues_pix()
                .then(|| artifact_url("pix", &id)),
            transaction_receipt_url: None,
            id,
            customer_id: params.customer,
            billing_type: params.billing_type,
            value: params.value,
            due_date: params.due_date,
            description: params.description,
            external_reference: params.external_reference,
            installment_count: params.installment_count,
            installment_value: params.installment_value,
            status: PaymentStatus::Pending,
        };

        self.payments.insert(payment.id.clone(), payment.clone());
        if let Some(reference) = &payment.external_reference {
            self.payments_by_external_ref
                .insert(reference.clone(), payment.id.clone());
        }

        debug!(
            payment_id = %payment.id,
            billing_type = %payment.billing_type,
            "Simulated payment created"
        );
        Ok(payment)
    }

    pub fn payment(&self, payment_id: &str) -> Option<ProviderPayment> {
        self.payments.get(payment_id).map(|p| p.value().clone())
    }

    pub fn payment_by_external_reference(&self, reference: &str) -> Option<ProviderPayment> {
        let id = self.payments_by_external_ref.get(reference)?.value().clone();
        self.payment(&id)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────────

    /// Moves a payment to `next`, rejecting moves the lifecycle forbids.
    pub fn transition(
        &self,
        payment_id: &str,
        next: PaymentStatus,
    ) -> Result<ProviderPayment, PaymentError> {
        let mut payment = self
            .payments
            .get_mut(payment_id)
            .ok_or_else(|| PaymentError::PaymentNotFound(payment_id.to_string()))?;

        apply(&mut payment, next)?;
        Ok(payment.value().clone())
    }

    pub fn confirm(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError> {
        self.transition(payment_id, PaymentStatus::Confirmed)
    }

    pub fn receive(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError> {
        self.transition(payment_id, PaymentStatus::Received)
    }

    pub fn mark_overdue(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError> {
        self.transition(payment_id, PaymentStatus::Overdue)
    }

    pub fn delete(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError> {
        self.transition(payment_id, PaymentStatus::Deleted)
    }

    pub fn cancel(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError> {
        self.transition(payment_id, PaymentStatus::Cancelled)
    }

    /// Refunds a payment. A partial `value` may not exceed the charged value.
    pub fn refund(
        &self,
        payment_id: &str,
        value: Option<Decimal>,
    ) -> Result<ProviderPayment, PaymentError> {
        let mut payment = self
            .payments
            .get_mut(payment_id)
            .ok_or_else(|| PaymentError::PaymentNotFound(payment_id.to_string()))?;

        if let Some(amount) = value {
            if amount <= Decimal::ZERO || amount > payment.value {
                return Err(PaymentError::Validation(format!(
                    "Refund value {amount} must be positive and at most {}",
                    payment.value
                )));
            }
        }

        apply(&mut payment, PaymentStatus::Refunded)?;
        Ok(payment.value().clone())
    }

    #[cfg(test)]
    fn customer_count(&self) -> usize {
        self.customers.len()
    }

    #[cfg(test)]
    fn payment_count(&self) -> usize {
        self.payments.len()
    }
}

fn apply(payment: &mut ProviderPayment, next: PaymentStatus) -> Result<(), PaymentError> {
    if !payment.status.can_transition_to(next) {
        return Err(PaymentError::InvalidTransition {
            id: payment.id.clone(),
            from: payment.status,
            to: next,
        });
    }

    debug!(payment_id = %payment.id, from = %payment.status, to = %next, "Simulated status change");
    payment.status = next;
    if next == PaymentStatus::Received {
        payment.transaction_receipt_url = Some(artifact_url("receipt", &payment.id));
    }
    Ok(())
}
