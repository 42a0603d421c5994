//! Core data model definitions shared across vinscan crates.
#![allow(missing_docs)]

pub use ::chrono;

pub mod outcome;
pub mod payload;
pub mod record;
#[cfg(feature = "serde")]
pub mod wire;

pub use outcome::{FatalError, LookupOutcome};
pub use payload::{
    InvalidReason, Malformation, RawPayload, ValidationResult, VIN_LENGTH,
};
pub use record::VerificationRecord;
#[cfg(feature = "serde")]
pub use wire::{
    AddVinRequest, AddVinResponse, ApiErrorBody, CheckVinResponse,
    HealthResponse,
};
