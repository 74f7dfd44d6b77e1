//! Persistence Sink: case table upsert plus optional note mirror

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use casebot_core::{CaseStore, ExtractedCase, StoredCase};

use crate::notes::NoteWriter;

/// Per-run persistence counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistenceReport {
    pub upserted: usize,
    pub upsert_failures: usize,
    pub notes_written: usize,
    pub note_failures: usize,
}

pub struct PersistenceSink {
    store: Option<Arc<dyn CaseStore>>,
    notes: Option<NoteWriter>,
}

impl PersistenceSink {
    pub fn new(store: Option<Arc<dyn CaseStore>>, notes: Option<NoteWriter>) -> Self {
        Self { store, notes }
    }

    /// Sink with nothing configured
    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some() || self.notes.is_some()
    }

    /// Persist every case. Each case and each target is independent: a
    /// failure is logged and the remaining work still runs.
    #[instrument(skip(self, cases), fields(cases = cases.len()))]
    pub async fn persist(&self, cases: &[ExtractedCase], observed_at: DateTime<Utc>) -> PersistenceReport {
        let mut report = PersistenceReport::default();

        for case in cases {
            if let Some(store) = &self.store {
                let row = StoredCase::from_case(case, observed_at);
                match store.upsert_case(&row).await {
                    Ok(()) => report.upserted += 1,
                    Err(e) => {
                        report.upsert_failures += 1;
                        warn!(url = %case.origin_url, error = %e, "Failed to upsert case");
                    }
                }
            }

            if let Some(notes) = &self.notes {
                match notes.write(case, observed_at).await {
                    Ok(_) => report.notes_written += 1,
                    Err(e) => {
                        report.note_failures += 1;
                        warn!(url = %case.origin_url, error = %e, "Failed to write note");
                    }
                }
            }
        }

        info!(
            upserted = report.upserted,
            upsert_failures = report.upsert_failures,
            notes = report.notes_written,
            note_failures = report.note_failures,
            "Persistence finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use casebot_core::{CaseBotError, CaseBotResult, MemoryCaseStore};
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn case(url: &str, title: &str) -> ExtractedCase {
        ExtractedCase {
            title: title.to_string(),
            profit_description: "$500".to_string(),
            profit_numeric: None,
            category: "Tool".to_string(),
            tags: vec![],
            difficulty_score: 2,
            scheme: "Steps".to_string(),
            stack: "Zapier".to_string(),
            origin_url: url.to_string(),
            origin_label: "RSS".to_string(),
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap()
    }

    /// Fails for one URL, records every attempt
    struct FlakyStore {
        failing_url: &'static str,
        attempts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CaseStore for FlakyStore {
        async fn contains_url(&self, _url: &str, _since: Option<DateTime<Utc>>) -> CaseBotResult<bool> {
            Ok(false)
        }

        async fn upsert_case(&self, case: &StoredCase) -> CaseBotResult<()> {
            self.attempts.lock().unwrap().push(case.url.clone());
            if case.url == self.failing_url {
                return Err(CaseBotError::storage("constraint violation"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_reprocessing_overwrites_by_url() {
        let store = Arc::new(MemoryCaseStore::new());
        let sink = PersistenceSink::new(Some(store.clone()), None);

        sink.persist(&[case("https://x/1", "First")], at()).await;
        sink.persist(&[case("https://x/1", "Second")], at()).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("https://x/1").await.unwrap().title, "Second");
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_rest() {
        let store = Arc::new(FlakyStore {
            failing_url: "https://x/1",
            attempts: Mutex::new(Vec::new()),
        });
        let tmp = tempfile::tempdir().unwrap();
        let sink = PersistenceSink::new(Some(store.clone()), Some(NoteWriter::new(tmp.path())));

        let report = sink
            .persist(
                &[
                    case("https://x/0", "Zero"),
                    case("https://x/1", "One"),
                    case("https://x/2", "Two"),
                ],
                at(),
            )
            .await;

        assert_eq!(
            *store.attempts.lock().unwrap(),
            vec!["https://x/0", "https://x/1", "https://x/2"]
        );
        assert_eq!(report.upserted, 2);
        assert_eq!(report.upsert_failures, 1);
        // Notes are written regardless of the table outcome
        assert_eq!(report.notes_written, 3);
    }

    #[tokio::test]
    async fn test_note_failure_is_independent() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let store = Arc::new(MemoryCaseStore::new());
        let sink = PersistenceSink::new(Some(store.clone()), Some(NoteWriter::new(&blocker)));

        let report = sink.persist(&[case("https://x/0", "Zero")], at()).await;
        assert_eq!(report.upserted, 1);
        assert_eq!(report.note_failures, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_disabled_sink_does_nothing() {
        let sink = PersistenceSink::disabled();
        assert!(!sink.is_enabled());
        let report = sink.persist(&[case("https://x/0", "Zero")], at()).await;
        assert_eq!(report, PersistenceReport::default());
    }
}
