//! # Paygate Providers
//!
//! Concrete `PaymentProvider` adapters and the registry that selects one
//! from configuration.
//!
//! - `asaas/` - live gateway adapter over the Asaas REST API
//! - `custom/` - self-contained test-mode gateway backed by an in-memory simulator
//! - `registry` - configuration-driven factory caching one instance per provider

pub mod asaas;
pub mod custom;
pub mod registry;

mod notification;

pub use asaas::AsaasAdapter;
pub use custom::{CustomGateway, TestModeSimulator};
pub use registry::ProviderRegistry;
