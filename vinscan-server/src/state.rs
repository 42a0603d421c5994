use std::sync::Arc;

use vinscan_config::ApiKey;
use vinscan_core::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub api_key: Arc<ApiKey>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, api_key: ApiKey) -> Self {
        Self {
            store,
            api_key: Arc::new(api_key),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}
