//! Error types for holdings-exchange
//!
//! Stream-ending failures are `ExchangeError`. Per-record failures never end
//! the run: they are either `MalformedRecord` (decode time) or a
//! `DropReason` (after the fan-out), logged once and counted in the report.

use std::fmt;
use thiserror::Error;

/// Errors that end an exchange run
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Record source (review service) failed
    #[error("Review service error: {0}")]
    Source(#[from] SourceError),

    /// First record lacks expected fields
    #[error("Review documents are missing expected fields: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    /// Search API unreachable for too many consecutive queries
    #[error("Search API unavailable after {failures} consecutive transport failures: {last}")]
    BackendUnavailable { failures: u32, last: String },

    /// Invalid runtime configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// holdings-common error
    #[error("Common error: {0}")]
    Common(#[from] holdings_common::Error),
}

/// Result type for exchange operations
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Review service client errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Review service returned {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Could not decode review response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Record that cannot be planned
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecord {
    #[error("record has no identifier")]
    MissingId,

    #[error("record {id} has no search query")]
    MissingQuery { id: String },

    #[error("record {id} has unsupported type '{value}'")]
    UnknownType { id: String, value: String },
}

/// Why a record was dropped after its queries were issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// One of the record's queries failed
    QueryFailed(String),
    /// Primary response has no documents
    NoResults,
    /// Serial responses disagree on the total document count
    TotalMismatch {
        issue_by_volume: u64,
        host_dates: u64,
        fallback_dates: u64,
    },
    /// Monograph query matches several documents
    AmbiguousMonograph { total: u64 },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::QueryFailed(message) => write!(f, "query failed: {}", message),
            DropReason::NoResults => f.write_str("no search API result"),
            DropReason::TotalMismatch {
                issue_by_volume,
                host_dates,
                fallback_dates,
            } => write!(
                f,
                "total mismatch between aggregation responses ({} / {} / {})",
                issue_by_volume, host_dates, fallback_dates
            ),
            DropReason::AmbiguousMonograph { total } => {
                write!(f, "monograph query matches {} documents", total)
            }
        }
    }
}
