//! Asaas vocabulary → canonical status and event names.

use paygate_types::{PaymentStatus, WebhookEventType};

/// Maps an Asaas payment status onto the canonical lifecycle.
///
/// Unknown statuses fall back to `pending`.
pub fn map_asaas_status(asaas_status: &str) -> PaymentStatus {
    match asaas_status {
        "PENDING" | "AWAITING_RISK_ANALYSIS" => PaymentStatus::Pending,
        "CONFIRMED" => PaymentStatus::Confirmed,
        "RECEIVED" | "DUNNING_RECEIVED" => PaymentStatus::Received,
        "OVERDUE" | "DUNNING_REQUESTED" => PaymentStatus::Overdue,
        "REFUNDED"
        | "REFUND_REQUESTED"
        | "CHARGEBACK_REQUESTED"
        | "CHARGEBACK_DISPUTE"
        | "AWAITING_CHARGEBACK_REVERSAL" => PaymentStatus::Refunded,
        "DELETED" => PaymentStatus::Deleted,
        _ => PaymentStatus::Pending,
    }
}

/// Maps an Asaas webhook event onto the six canonical events.
///
/// Unknown events fall back to `PAYMENT_CREATED`.
pub fn map_asaas_event(asaas_event: &str) -> WebhookEventType {
    match asaas_event {
        "PAYMENT_CREATED" | "PAYMENT_RESTORED" => WebhookEventType::PaymentCreated,
        "PAYMENT_UPDATED"
        | "PAYMENT_CONFIRMED"
        | "PAYMENT_BANK_SLIP_VIEWED"
        | "PAYMENT_CHECKOUT_VIEWED" => WebhookEventType::PaymentConfirmed,
        "PAYMENT_RECEIVED" | "PAYMENT_DUNNING_RECEIVED" => WebhookEventType::PaymentReceived,
        "PAYMENT_OVERDUE" | "PAYMENT_DUNNING_REQUESTED" => WebhookEventType::PaymentOverdue,
        "PAYMENT_REFUNDED"
        | "PAYMENT_RECEIVED_IN_CASH_UNDONE"
        | "PAYMENT_CHARGEBACK_REQUESTED"
        | "PAYMENT_CHARGEBACK_DISPUTE"
        | "PAYMENT_AWAITING_CHARGEBACK_REVERSAL" => WebhookEventType::PaymentRefunded,
        "PAYMENT_DELETED" => WebhookEventType::PaymentDeleted,
        _ => WebhookEventType::PaymentCreated,
    }
}
