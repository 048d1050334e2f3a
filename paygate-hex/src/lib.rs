//! # Paygate Hex
//!
//! Application services and HTTP adapter for the payment gateway.
//!
//! ## Architecture
//!
//! - `service/` - audited `PaymentService` wrapping the active provider
//! - `webhook/` - notification parsing and agreement state derivation
//! - `security/` - PCI helpers (masking, log sanitization, webhook tokens,
//!   AES-256-GCM field encryption)
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! Services hold `Arc<dyn PaymentProvider>`; the concrete provider is picked
//! by the composition root through the provider registry.

pub mod inbound;
pub mod security;
pub mod service;
pub mod webhook;

#[cfg(test)]
mod service_tests;

pub use service::{PaymentService, SimulationAction};
pub use webhook::WebhookService;
