//! Local record stores.
//!
//! Back the API server and the offline lookup mode. Keys are normalized
//! (uppercase) VINs.

use async_trait::async_trait;
use vinscan_model::VerificationRecord;

use crate::error::StoreError;

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Result of an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    pub record: VerificationRecord,
    /// `false` when an existing record was overwritten.
    pub created: bool,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(
        &self,
        code: &str,
    ) -> Result<Option<VerificationRecord>, StoreError>;

    /// Insert or overwrite. Always refreshes `recorded_at`.
    async fn upsert(
        &self,
        code: &str,
        description: &str,
    ) -> Result<Upserted, StoreError>;

    async fn len(&self) -> Result<usize, StoreError>;
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for std::sync::Arc<S> {
    async fn get(
        &self,
        code: &str,
    ) -> Result<Option<VerificationRecord>, StoreError> {
        (**self).get(code).await
    }

    async fn upsert(
        &self,
        code: &str,
        description: &str,
    ) -> Result<Upserted, StoreError> {
        (**self).upsert(code, description).await
    }

    async fn len(&self) -> Result<usize, StoreError> {
        (**self).len().await
    }
}

pub(crate) fn store_key(code: &str) -> Result<String, StoreError> {
    let key = code.trim().to_ascii_uppercase();
    if key.is_empty() {
        return Err(StoreError::InvalidRecord("empty VIN".to_string()));
    }
    Ok(key)
}
