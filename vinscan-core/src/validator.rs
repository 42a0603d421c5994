//! VIN format validation.
//!
//! Pure functions: no I/O, no state. Every rejection is an
//! [`InvalidReason::MalformedPayload`] whose [`Malformation`] names the check
//! that failed. Input is taken as-is; line endings are the reader's concern.

use vinscan_model::{
    InvalidReason, Malformation, RawPayload, VIN_LENGTH, ValidationResult,
};

/// Classify a raw payload.
pub fn validate(payload: &RawPayload) -> ValidationResult {
    match payload {
        RawPayload::Undecodable(_) => malformed(Malformation::Undecodable),
        RawPayload::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => validate_str(text),
            Err(_) => malformed(Malformation::NotUtf8),
        },
    }
}

/// Classify already-decoded text.
pub fn validate_str(text: &str) -> ValidationResult {
    if text.is_empty() {
        return malformed(Malformation::Empty);
    }

    let len = text.chars().count();
    if len != VIN_LENGTH {
        return malformed(Malformation::WrongLength { len });
    }

    if let Some(ch) = text.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return malformed(Malformation::IllegalCharacter { ch });
    }

    ValidationResult::Valid(text.to_ascii_uppercase())
}

fn malformed(detail: Malformation) -> ValidationResult {
    ValidationResult::Invalid(InvalidReason::malformed(detail))
}
