use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use vinscan_model::VerificationRecord;

use super::{RecordStore, Upserted, store_key};
use crate::error::StoreError;

/// Store persisted as a JSON array of records.
///
/// The whole file is rewritten on every upsert through a sibling temp file
/// and a rename, so readers never observe a half-written snapshot. Fine for
/// the tens of thousands of VINs a yard deals with; not a database.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: RwLock<HashMap<String, VerificationRecord>>,
}

impl JsonFileStore {
    /// Load `path`, starting empty when it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => {
                HashMap::new()
            }
            Ok(bytes) => {
                let list: Vec<VerificationRecord> =
                    serde_json::from_slice(&bytes)?;
                list.into_iter()
                    .map(|record| (record.code.to_ascii_uppercase(), record))
                    .collect()
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };

        info!(path = %path.display(), records = records.len(), "opened record store");
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(
        &self,
        records: &HashMap<String, VerificationRecord>,
    ) -> Result<(), StoreError> {
        let mut list: Vec<&VerificationRecord> = records.values().collect();
        list.sort_by(|a, b| a.code.cmp(&b.code));
        let bytes = serde_json::to_vec_pretty(&list)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), records = list.len(), "persisted record store");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
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

        let mut guard = self.records.write().await;
        let previous = guard.insert(key.clone(), record.clone());
        if let Err(err) = self.persist(&guard).await {
            // Keep memory and disk in agreement.
            match previous {
                Some(previous) => guard.insert(key, previous),
                None => guard.remove(&key),
            };
            return Err(err);
        }

        Ok(Upserted {
            record,
            created: previous.is_none(),
        })
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vins.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 0);
        store.upsert("1HGCM82633A004352", "Silver Accord").await.unwrap();
        store.upsert("JH4KA8260MC000000", "Legend").await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.len().await.unwrap(), 2);
        let record = reopened.get("1hgcm82633a004352").await.unwrap().unwrap();
        assert_eq!(record.description, "Silver Accord");
        assert!(!dir.path().join("vins.json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vins.json");
        std::fs::write(&path, "{ nope").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path).await,
            Err(StoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn failed_persist_rolls_back_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-subdir").join("vins.json");
        let store = JsonFileStore::open(&path).await.unwrap();

        assert!(store.upsert("1HGCM82633A004352", "x").await.is_err());
        assert_eq!(store.len().await.unwrap(), 0);
    }
}
