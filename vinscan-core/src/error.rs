use std::path::PathBuf;

use thiserror::Error;

/// The code reader lost its device. Terminates the scan pipeline.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame source not available: {}", .0.display())]
    Unavailable(PathBuf),

    #[error("Input stream closed")]
    Disconnected,

    #[error("Device failure: {0}")]
    Failed(String),
}

/// Failures raised by a [`RecordStore`](crate::store::RecordStore).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Failures from the non-lookup routes of the record-store API
/// (enrollment and health).
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid API key")]
    Unauthorized,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Errors that escape [`ScanPipeline::run`](crate::pipeline::ScanPipeline::run).
///
/// Validation and lookup failures are always resolved inside the pipeline;
/// only losing the reader ends a run with an error.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Code reader failed: {0}")]
    Device(#[from] DeviceError),
}

pub type Result<T> = std::result::Result<T, ScanError>;
