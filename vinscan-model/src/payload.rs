use std::fmt;

/// Number of characters in a vehicle identification number.
pub const VIN_LENGTH: usize = 17;

/// What a code reader extracted from a single decoded symbol.
///
/// Readers never fail a frame because one symbol could not be turned into
/// text; they hand the validator an [`RawPayload::Undecodable`] instead so
/// the rejection shows up as a resolved state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPayload {
    /// Raw symbol bytes. Not guaranteed to be UTF-8.
    Bytes(Vec<u8>),
    /// A symbol was located but its data could not be recovered.
    Undecodable(String),
}

impl RawPayload {
    pub fn text(value: impl Into<String>) -> Self {
        RawPayload::Bytes(value.into().into_bytes())
    }

    /// Best-effort textual rendering for logs and UI.
    pub fn display_lossy(&self) -> String {
        match self {
            RawPayload::Bytes(bytes) => {
                String::from_utf8_lossy(bytes).trim().to_string()
            }
            RawPayload::Undecodable(_) => "<undecodable>".to_string(),
        }
    }
}

impl From<&str> for RawPayload {
    fn from(value: &str) -> Self {
        RawPayload::text(value)
    }
}

impl From<String> for RawPayload {
    fn from(value: String) -> Self {
        RawPayload::text(value)
    }
}

/// Why a payload was rejected before any lookup happened.
///
/// Every format rejection is a malformed payload; the detail says which
/// check tripped so the operator can tell a short read from a bad scan.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "reason", rename_all = "snake_case"))]
pub enum InvalidReason {
    /// The payload cannot be a VIN.
    MalformedPayload { detail: Malformation },
}

impl InvalidReason {
    pub fn malformed(detail: Malformation) -> Self {
        InvalidReason::MalformedPayload { detail }
    }

    pub fn detail(&self) -> &Malformation {
        match self {
            InvalidReason::MalformedPayload { detail } => detail,
        }
    }
}

impl From<Malformation> for InvalidReason {
    fn from(detail: Malformation) -> Self {
        InvalidReason::malformed(detail)
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::MalformedPayload { detail } => detail.fmt(f),
        }
    }
}

/// Which format check a malformed payload failed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Malformation {
    Empty,
    NotUtf8,
    /// A symbol was located but its data could not be recovered.
    Undecodable,
    /// Text is not exactly 17 characters long.
    WrongLength { len: usize },
    /// Text contains a character outside `[0-9A-Za-z]`.
    IllegalCharacter { ch: char },
}

impl fmt::Display for Malformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Malformation::Empty => write!(f, "malformed payload: empty"),
            Malformation::NotUtf8 => write!(f, "malformed payload: not UTF-8"),
            Malformation::Undecodable => {
                write!(f, "malformed payload: symbol could not be decoded")
            }
            Malformation::WrongLength { len } => write!(
                f,
                "invalid VIN format: expected {VIN_LENGTH} characters, got {len}"
            ),
            Malformation::IllegalCharacter { ch } => {
                write!(f, "invalid VIN format: illegal character {ch:?}")
            }
        }
    }
}

/// Outcome of format validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Uppercase-normalized code.
    Valid(String),
    Invalid(InvalidReason),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    pub fn normalized(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid(code) => Some(code),
            ValidationResult::Invalid(_) => None,
        }
    }
}
