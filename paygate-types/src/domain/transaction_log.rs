//! Audit trail of provider operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One attempted provider operation, successful or not.
///
/// Transaction logs are append-only - they represent a historical
/// record of what was sent to the provider and what came back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLog {
    pub id: Uuid,
    /// Provider name (`asaas`, `custom`)
    pub provider: String,
    /// Operation name (`createPayment`, `refundPayment`, ...)
    pub operation: String,
    pub request_data: serde_json::Value,
    pub response_data: Option<serde_json::Value>,
    pub error_message: Option<String>,
    /// Tenant that issued the call
    pub company_id: Option<String>,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// A log entry before the sink assigns its identity and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransactionLog {
    pub provider: String,
    pub operation: String,
    pub request_data: serde_json::Value,
    pub response_data: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub company_id: Option<String>,
    pub duration_ms: u64,
}

impl NewTransactionLog {
    /// Stamps the entry with a fresh id and the current time.
    pub fn into_log(self) -> TransactionLog {
        TransactionLog {
            id: Uuid::new_v4(),
            provider: self.provider,
            operation: self.operation,
            request_data: self.request_data,
            response_data: self.response_data,
            error_message: self.error_message,
            company_id: self.company_id,
            duration_ms: self.duration_ms,
            created_at: Utc::now(),
        }
    }
}
