use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use vinscan_model::VerificationRecord;

use super::{RecordStore, Upserted, store_key};
use crate::error::StoreError;

/// Process-local store. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, VerificationRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(
        records: impl IntoIterator<Item = VerificationRecord>,
    ) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.code.to_ascii_uppercase(), record))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(
        &self,
        code: &str,
    ) -> Result<Option<VerificationRecord>, StoreError> {
        let key = store_key(code)?;
        Ok(self.records.read().await.get(&key).cloned())
    }

    async fn upsert(
        &self,
        code: &str,
        description: &str,
    ) -> Result<Upserted, StoreError> {
        let key = store_key(code)?;
        let record = VerificationRecord::new(&key, description, Utc::now());
        let previous = self.records.write().await.insert(key, record.clone());
        Ok(Upserted {
            record,
            created: previous.is_none(),
        })
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}
