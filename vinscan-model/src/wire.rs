//! JSON bodies exchanged between the lookup client and the record-store API.

use serde::{Deserialize, Serialize};

use crate::chrono::{DateTime, Utc};

/// Body of `GET /api/check_vin`.
///
/// `scan_date` is kept as text: older deployments emit RFC 2822 dates while
/// this server emits RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckVinResponse {
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_date: Option<String>,
}

impl CheckVinResponse {
    pub fn missing() -> Self {
        Self {
            found: false,
            description: None,
            scan_date: None,
        }
    }

    pub fn found(description: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            found: true,
            description: Some(description.into()),
            scan_date: Some(at.to_rfc3339()),
        }
    }

    /// Parses `scan_date` as RFC 3339 first, then RFC 2822.
    pub fn parsed_scan_date(&self) -> Option<DateTime<Utc>> {
        let raw = self.scan_date.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_rfc2822(raw))
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }
}

/// Body of `POST /api/add_vin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddVinRequest {
    pub vin_value: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddVinResponse {
    pub success: bool,
    /// `true` when the VIN was not previously enrolled.
    #[serde(default)]
    pub created: bool,
}

/// Error body returned by every failing API route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub records: usize,
}
