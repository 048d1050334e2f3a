//! Domain models for the payment gateway abstraction.

pub mod agreement;
pub mod customer;
pub mod payment;
pub mod transaction_log;
pub mod webhook;

pub use agreement::AgreementUpdate;
pub use customer::{ProviderCustomer, mask_document, normalize_document};
pub use payment::{BillingType, PaymentStatus, ProviderPayment};
pub use transaction_log::{NewTransactionLog, TransactionLog};
pub use webhook::{WebhookEventType, WebhookPayload, WebhookPayment};
