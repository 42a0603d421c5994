//! Configuration for the vinscan binaries.
//!
//! [`ConfigLoader`] layers defaults, an optional TOML/JSON file, `.env` and
//! environment overrides into a [`ScanConfig`] for the operator CLI.
//! [`ServerConfig`] is read straight from the environment by the API server.
//! [`logging::init_logging`] installs the shared tracing subscriber.

#![allow(missing_docs)]

pub mod credential;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;

pub use credential::ApiKey;
pub use error::ConfigError;
pub use loader::{ConfigLoad, ConfigLoader, ConfigSource};
pub use models::{
    ApiConfig, ConfigWarning, PipelineConfig, RetryConfig, ScanConfig,
    ServerConfig, SourceConfig, SourceKind,
};
