//! Single-shot verification queries against a record store.

use async_trait::async_trait;
use vinscan_model::LookupOutcome;

pub mod http;
pub mod store;

pub use http::{HttpLookupClient, HttpLookupConfig};
pub use store::StoreLookupClient;

/// One round trip to the record store.
///
/// Implementations never return `Err`: every failure is classified into
/// [`LookupOutcome::TransientError`] or [`LookupOutcome::FatalError`] so the
/// caller can decide on retries by matching.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LookupClient: Send + Sync {
    async fn lookup(&self, code: &str) -> LookupOutcome;
}

#[async_trait]
impl<C: LookupClient + ?Sized> LookupClient for std::sync::Arc<C> {
    async fn lookup(&self, code: &str) -> LookupOutcome {
        (**self).lookup(code).await
    }
}
