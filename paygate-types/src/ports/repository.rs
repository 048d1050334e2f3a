//! Audit-log repository port.
//!
//! The payment service writes through this port; storage adapters implement it.

use crate::domain::{NewTransactionLog, TransactionLog};
use crate::error::RepoError;

/// Number of entries returned by the read side when no limit is given.
pub const DEFAULT_LOG_LIMIT: usize = 100;

/// Append-only sink for [`TransactionLog`] entries.
#[async_trait::async_trait]
pub trait TransactionRepository: Send + Sync + 'static {
    /// Appends one entry.
    async fn log(&self, entry: NewTransactionLog) -> Result<(), RepoError>;

    /// Newest-first entries for a provider.
    async fn get_by_provider(
        &self,
        provider: &str,
        limit: Option<usize>,
    ) -> Result<Vec<TransactionLog>, RepoError>;

    /// Newest-first entries for a tenant.
    async fn get_by_company_id(
        &self,
        company_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<TransactionLog>, RepoError>;

    /// Newest-first entries for a tenant, restricted to one provider.
    async fn get_by_company_and_provider(
        &self,
        company_id: &str,
        provider: &str,
        limit: Option<usize>,
    ) -> Result<Vec<TransactionLog>, RepoError>;
}
