//! In-process audit-log repository.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use paygate_types::{
    DEFAULT_LOG_LIMIT, NewTransactionLog, RepoError, TransactionLog, TransactionRepository,
};

/// Entries retained when no explicit capacity is configured.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

// ─────────────────────────────────────────────────────────────────────────────
// In-memory Repository
// ─────────────────────────────────────────────────────────────────────────────

/// Bounded log kept in insertion order.
///
/// Once `max_entries` is reached the oldest entry is dropped for every new
/// one. Reads walk the log backwards so callers always get newest entries
/// first.
pub struct InMemoryTransactionRepository {
    entries: RwLock<VecDeque<TransactionLog>>,
    max_entries: usize,
}

impl Default for InMemoryTransactionRepository {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retains at most `max_entries` (at least one).
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn newest_matching<F>(&self, limit: Option<usize>, matches: F) -> Vec<TransactionLog>
    where
        F: Fn(&TransactionLog) -> bool,
    {
        let limit = limit.unwrap_or(DEFAULT_LOG_LIMIT);
        self.entries
            .read()
            .await
            .iter()
            .rev()
            .filter(|entry| matches(entry))
            .take(limit)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn log(&self, entry: NewTransactionLog) -> Result<(), RepoError> {
        let entry = entry.into_log();
        debug!(
            provider = %entry.provider,
            operation = %entry.operation,
            duration_ms = entry.duration_ms,
            "Transaction logged"
        );

        let mut entries = self.entries.write().await;
        while entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(entry);
        Ok(())
    }

    async fn get_by_provider(
        &self,
        provider: &str,
        limit: Option<usize>,
    ) -> Result<Vec<TransactionLog>, RepoError> {
        Ok(self
            .newest_matching(limit, |entry| entry.provider == provider)
            .await)
    }

    async fn get_by_company_id(
        &self,
        company_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<TransactionLog>, RepoError> {
        Ok(self
            .newest_matching(limit, |entry| {
                entry.company_id.as_deref() == Some(company_id)
            })
            .await)
    }

    async fn get_by_company_and_provider(
        &self,
        company_id: &str,
        provider: &str,
        limit: Option<usize>,
    ) -> Result<Vec<TransactionLog>, RepoError> {
        Ok(self
            .newest_matching(limit, |entry| {
                entry.provider == provider && entry.company_id.as_deref() == Some(company_id)
            })
            .await)
    }
}
