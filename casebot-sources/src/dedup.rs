//! Deduplication against the ledger of already-processed URLs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use casebot_core::CaseStore;

/// Checks candidate URLs against the persisted ledger.
///
/// Fails open: without a store, or when the store errors, every URL is
/// reported as new.
#[derive(Clone, Default)]
pub struct DuplicateFilter {
    store: Option<Arc<dyn CaseStore>>,
    retention: Option<Duration>,
}

impl DuplicateFilter {
    pub fn new(store: Arc<dyn CaseStore>) -> Self {
        Self {
            store: Some(store),
            retention: None,
        }
    }

    /// A filter with no backing store
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Only ledger entries newer than `retention` count as seen.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = Some(retention);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Whether the URL is in the ledger. The retention window is measured
    /// back from `now`, the run's reference instant.
    pub async fn is_duplicate(&self, canonical_url: &str, now: DateTime<Utc>) -> bool {
        let Some(store) = &self.store else {
            return false;
        };

        let since = self.retention.map(|window| now - window);
        match store.contains_url(canonical_url, since).await {
            Ok(seen) => seen,
            Err(e) => {
                warn!(url = canonical_url, error = %e, "Duplicate check failed, treating as new");
                false
            }
        }
    }
}
