//! Storage seam shared by the deduplication filter and the persistence sink

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::case::StoredCase;
use crate::error::CaseBotResult;

/// A table of cases addressed by their unique `url`.
///
/// The set of stored URLs doubles as the ledger of already-processed items.
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Whether a row with this URL exists. When `since` is set, rows created
    /// before it are ignored.
    async fn contains_url(&self, url: &str, since: Option<DateTime<Utc>>) -> CaseBotResult<bool>;

    /// Insert the case, replacing any existing row with the same URL.
    async fn upsert_case(&self, case: &StoredCase) -> CaseBotResult<()>;
}

/// In-memory [`CaseStore`] keyed by URL
#[derive(Debug, Default)]
pub struct MemoryCaseStore {
    rows: RwLock<HashMap<String, StoredCase>>,
}

impl MemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    pub async fn get(&self, url: &str) -> Option<StoredCase> {
        self.rows.read().await.get(url).cloned()
    }
}

#[async_trait]
impl CaseStore for MemoryCaseStore {
    async fn contains_url(&self, url: &str, since: Option<DateTime<Utc>>) -> CaseBotResult<bool> {
        let rows = self.rows.read().await;
        Ok(match (rows.get(url), since) {
            (Some(row), Some(since)) => row.created_at >= since,
            (Some(_), None) => true,
            (None, _) => false,
        })
    }

    async fn upsert_case(&self, case: &StoredCase) -> CaseBotResult<()> {
        self.rows
            .write()
            .await
            .insert(case.url.clone(), case.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn row(url: &str, title: &str, created_at: DateTime<Utc>) -> StoredCase {
        StoredCase {
            url: url.to_string(),
            title: title.to_string(),
            profit: "$500".to_string(),
            profit_num: None,
            category: "Other".to_string(),
            tags: vec![],
            difficulty_score: 3,
            scheme: String::new(),
            stack: String::new(),
            source: "RSS".to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_url() {
        let store = MemoryCaseStore::new();
        let now = Utc::now();
        store.upsert_case(&row("https://a/1", "first", now)).await.unwrap();
        store.upsert_case(&row("https://a/1", "second", now)).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("https://a/1").await.unwrap().title, "second");
    }

    #[tokio::test]
    async fn test_contains_url_respects_retention() {
        let store = MemoryCaseStore::new();
        let now = Utc::now();
        store
            .upsert_case(&row("https://a/old", "old", now - Duration::days(40)))
            .await
            .unwrap();

        assert!(store.contains_url("https://a/old", None).await.unwrap());
        assert!(!store
            .contains_url("https://a/old", Some(now - Duration::days(30)))
            .await
            .unwrap());
        assert!(!store.contains_url("https://a/missing", None).await.unwrap());
    }
}
