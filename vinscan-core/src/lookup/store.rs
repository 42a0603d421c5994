use async_trait::async_trait;
use tracing::warn;
use vinscan_model::{FatalError, LookupOutcome};

use super::LookupClient;
use crate::{error::StoreError, store::RecordStore};

/// Looks codes up in a local [`RecordStore`] (offline mode).
#[derive(Debug, Clone)]
pub struct StoreLookupClient<S> {
    store: S,
}

impl<S: RecordStore> StoreLookupClient<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: RecordStore> LookupClient for StoreLookupClient<S> {
    async fn lookup(&self, code: &str) -> LookupOutcome {
        match self.store.get(code).await {
            Ok(Some(record)) => LookupOutcome::Found(record),
            Ok(None) => LookupOutcome::NotFound,
            Err(StoreError::Io(err)) => {
                warn!(error = %err, "local store I/O failure");
                LookupOutcome::TransientError(err.to_string())
            }
            Err(err @ (StoreError::Serialization(_) | StoreError::InvalidRecord(_))) => {
                LookupOutcome::FatalError(FatalError::Protocol(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn maps_hits_and_misses() {
        let store = MemoryStore::new();
        store.upsert("1HGCM82633A004352", "Silver Accord").await.unwrap();
        let client = StoreLookupClient::new(store);

        assert!(client.lookup("1HGCM82633A004352").await.is_found());
        assert_eq!(
            client.lookup("JH4KA8260MC000000").await,
            LookupOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn invalid_key_is_fatal() {
        let client = StoreLookupClient::new(MemoryStore::new());
        assert!(matches!(
            client.lookup("").await,
            LookupOutcome::FatalError(FatalError::Protocol(_))
        ));
    }
}
