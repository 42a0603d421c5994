//! # vinscan-core
//!
//! Scan-to-verification pipeline for VIN QR stickers.
//!
//! A [`CodeReader`](reader::CodeReader) yields decoded payloads per frame,
//! the [`validator`] rejects anything that is not a well-formed VIN, a
//! [`LookupClient`](lookup::LookupClient) wrapped in
//! [`RetryingLookup`](retry::RetryingLookup) asks the record store about the
//! code, and the [`ScanPipeline`](pipeline::ScanPipeline) state machine
//! sequences all of it and reports each state to a
//! [`Presenter`](presenter::Presenter).
//!
//! ## Feature Flags
//!
//! - `frames` (default): image-directory reader decoding QR symbols with `rqrr`
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use tokio_util::sync::CancellationToken;
//! use vinscan_core::{
//!     lookup::{HttpLookupClient, HttpLookupConfig},
//!     pipeline::{PipelineSettings, ScanPipeline},
//!     presenter::TerminalPresenter,
//!     reader::LineReader,
//!     retry::{RetryPolicy, RetryingLookup},
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpLookupClient::new(HttpLookupConfig {
//!     base_url: "http://127.0.0.1:5000".into(),
//!     api_key: "secret".into(),
//!     timeout: Duration::from_secs(5),
//! })?;
//! let pipeline = ScanPipeline::new(
//!     LineReader::stdin(),
//!     RetryingLookup::new(client, RetryPolicy::default()),
//!     TerminalPresenter::stdout(true),
//!     PipelineSettings::default(),
//! );
//! let summary = pipeline.run(CancellationToken::new()).await?;
//! println!("{} lookups", summary.lookups);
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]

/// Error types shared by every stage
pub mod error;
/// Record-store clients
pub mod lookup;
/// The scan state machine
pub mod pipeline;
/// Rendering of pipeline states
pub mod presenter;
/// Frame sources
pub mod reader;
/// Backoff around lookups
pub mod retry;
/// Local record stores
pub mod store;
pub mod validator;

pub use error::{ApiError, DeviceError, Result, ScanError, StoreError};
pub use vinscan_model;
