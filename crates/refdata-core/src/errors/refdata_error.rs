use chrono::{DateTime, Utc};

use super::StorageError;

/// Top-level error type for the reference data store.
/// Storage errors convert into `TransactionFailure` via `From`.
#[derive(Debug, thiserror::Error)]
pub enum RefdataError {
    #[error("malformed fact: {reason}")]
    MalformedFact { reason: String },

    #[error(
        "event time {event_time} for {security_id} is below watermark {watermark}; \
         re-run with allow_late to backfill"
    )]
    WatermarkViolation {
        security_id: String,
        event_time: DateTime<Utc>,
        watermark: DateTime<Utc>,
    },

    #[error("transaction failure: {0}")]
    TransactionFailure(#[from] StorageError),

    #[error("invariant violation for {security_id}: {detail}")]
    InvariantViolation { security_id: String, detail: String },

    #[error(
        "knowledge time {knowledge_time} for {security_id} precedes recorded knowledge {latest}"
    )]
    KnowledgeTimeRegression {
        security_id: String,
        knowledge_time: DateTime<Utc>,
        latest: DateTime<Utc>,
    },

    #[error("invalid timestamp: {value:?}")]
    InvalidTimestamp { value: String },

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RefdataError {
    /// Stable machine-readable code, used in logs and CLI output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedFact { .. } => "MALFORMED_FACT",
            Self::WatermarkViolation { .. } => "WATERMARK_VIOLATION",
            Self::TransactionFailure(_) => "TRANSACTION_FAILURE",
            Self::InvariantViolation { .. } => "INVARIANT_VIOLATION",
            Self::KnowledgeTimeRegression { .. } => "KNOWLEDGE_TIME_REGRESSION",
            Self::InvalidTimestamp { .. } => "INVALID_TIMESTAMP",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::SerializationError(_) => "SERIALIZATION_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }
}

/// Convenience type alias.
pub type RefdataResult<T> = Result<T, RefdataError>;
