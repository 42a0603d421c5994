use std::{path::Path, sync::Arc};

use anyhow::Context;
use tracing::info;
use vinscan_config::ScanConfig;
use vinscan_core::{
    lookup::{HttpLookupClient, LookupClient, StoreLookupClient},
    store::{JsonFileStore, RecordStore},
};

/// Either the remote API or a local JSON store, chosen by `--store`.
pub enum Backend {
    Remote(HttpLookupClient),
    Local(Arc<JsonFileStore>),
}

impl Backend {
    pub async fn connect(config: &ScanConfig, store: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = store {
            let store = JsonFileStore::open(path)
                .await
                .with_context(|| format!("failed to open local store {}", path.display()))?;
            info!(path = %path.display(), "using local record store");
            return Ok(Backend::Local(Arc::new(store)));
        }

        let client = HttpLookupClient::new(config.api.lookup_config()?)
            .context("failed to build record store client")?;
        Ok(Backend::Remote(client))
    }

    pub fn lookup_client(&self) -> Arc<dyn LookupClient> {
        match self {
            Backend::Remote(client) => Arc::new(client.clone()),
            Backend::Local(store) => Arc::new(StoreLookupClient::new(store.clone())),
        }
    }

    /// Enroll or refresh a VIN. Returns `true` when it was newly created.
    pub async fn upsert(&self, code: &str, description: &str) -> anyhow::Result<bool> {
        match self {
            Backend::Remote(client) => {
                let response = client
                    .upsert(code, description)
                    .await
                    .context("enrollment request failed")?;
                Ok(response.created)
            }
            Backend::Local(store) => {
                let upserted = store
                    .upsert(code, description)
                    .await
                    .context("failed to write local store")?;
                Ok(upserted.created)
            }
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Remote(client) => write!(f, "Remote({})", client.base_url()),
            Backend::Local(store) => write!(f, "Local({})", store.path().display()),
        }
    }
}
