//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod provider;
mod repository;

pub use provider::{PaymentProvider, PaymentSimulation};
pub use repository::{DEFAULT_LOG_LIMIT, TransactionRepository};
