//! # Paygate Repository
//!
//! Audit-log repository adapters implementing the `TransactionRepository` port.
//!
//! Durable storage is owned by the host platform; this crate ships the
//! in-process adapter used by the binary and by tests.

mod memory;


pub use memory::{DEFAULT_MAX_ENTRIES, InMemoryTransactionRepository};
