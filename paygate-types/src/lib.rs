//! # Paygate Types
//!
//! Domain types and port traits for the payment-provider abstraction.
//! This crate has ZERO external IO dependencies - only data structures,
//! lifecycle rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (customers, payments, webhooks, audit records)
//! - `ports/` - Trait definitions that provider and repository adapters implement
//! - `dto/` - Request parameters crossing the provider boundary
//! - `config/` - Immutable configuration consumed by the composition root
//! - `error/` - Payment, repository and application error types

pub mod config;
pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use config::{GatewayMode, PaymentApiConfig, ProviderKind};
pub use domain::{
    AgreementUpdate, BillingType, NewTransactionLog, PaymentStatus, ProviderCustomer,
    ProviderPayment, TransactionLog, WebhookEventType, WebhookPayload, WebhookPayment,
    mask_document, normalize_document,
};
pub use dto::*;
pub use error::{AppError, PaymentError, RepoError};
pub use ports::{DEFAULT_LOG_LIMIT, PaymentProvider, PaymentSimulation, TransactionRepository};
