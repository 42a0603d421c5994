use std::fmt;

use crate::record::VerificationRecord;

/// Result of a single verification query (or a retried sequence of them).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(VerificationRecord),
    NotFound,
    /// Connectivity or timeout failure. Worth retrying.
    TransientError(String),
    /// Retrying cannot help.
    FatalError(FatalError),
}

impl LookupOutcome {
    pub fn is_transient(&self) -> bool {
        matches!(self, LookupOutcome::TransientError(_))
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }

    /// Short operator-facing summary.
    pub fn summary(&self) -> String {
        match self {
            LookupOutcome::Found(record) if record.description.is_empty() => {
                "VIN found in database".to_string()
            }
            LookupOutcome::Found(record) => {
                format!("Found match: {}", record.description)
            }
            LookupOutcome::NotFound => "VIN NOT FOUND IN DATABASE".to_string(),
            LookupOutcome::TransientError(detail) => {
                format!("Temporary lookup failure: {detail}")
            }
            LookupOutcome::FatalError(err) => err.to_string(),
        }
    }
}

/// Non-retryable lookup failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FatalError {
    /// The shared credential was rejected.
    Unauthorized,
    /// The store refused the request (malformed query, unknown route, ...).
    Rejected { status: u16, detail: String },
    /// The store answered with something we could not interpret.
    Protocol(String),
    /// Transient failures persisted past the retry budget.
    RetriesExhausted { attempts: u32, last: String },
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::Unauthorized => {
                write!(f, "Lookup rejected: invalid API key")
            }
            FatalError::Rejected { status, detail } => {
                write!(f, "Lookup rejected ({status}): {detail}")
            }
            FatalError::Protocol(detail) => {
                write!(f, "Unexpected response from record store: {detail}")
            }
            FatalError::RetriesExhausted { attempts, last } => write!(
                f,
                "Record store unreachable after {attempts} attempts: {last}"
            ),
        }
    }
}
