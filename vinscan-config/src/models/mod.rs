pub mod scan;
pub mod server;

pub use scan::{
    ApiConfig, ConfigWarning, PipelineConfig, RetryConfig, ScanConfig,
    SourceConfig, SourceKind,
};
pub use server::ServerConfig;
