use crate::chrono::{DateTime, Utc};

/// A VIN known to the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerificationRecord {
    pub code: String,
    pub description: String,
    pub recorded_at: DateTime<Utc>,
}

impl VerificationRecord {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            recorded_at,
        }
    }
}
