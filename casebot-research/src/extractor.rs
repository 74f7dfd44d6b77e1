//! Extraction Engine: one model call per run, ordered credential fallback

use std::sync::Arc;
use std::time::Duration;

use casebot_core::{Candidate, ExtractedCase};
use tracing::{debug, info, instrument, warn};

use crate::error::ModelError;
use crate::gemini::GenerativeModel;
use crate::prompt::{build_prompt, parse_cases, RawCase};

/// Candidates beyond this prefix are left out of the prompt
pub const DEFAULT_MAX_CANDIDATES: usize = 20;
/// Wait before moving on from a credential whose quota is used up
pub const DEFAULT_QUOTA_DELAY: Duration = Duration::from_secs(5);

const DEFAULT_CATEGORY: &str = "Other";
const MISSING_PROFIT: &str = "n/a";

/// Result of one extraction attempt across all credentials
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The model answered; the list may be empty
    Cases(Vec<ExtractedCase>),
    /// Every credential failed
    Unavailable,
}

pub struct CaseExtractor {
    model: Arc<dyn GenerativeModel>,
    api_keys: Vec<String>,
    max_candidates: usize,
    quota_delay: Duration,
}

impl CaseExtractor {
    pub fn new(model: Arc<dyn GenerativeModel>, api_keys: Vec<String>) -> Self {
        Self {
            model,
            api_keys,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            quota_delay: DEFAULT_QUOTA_DELAY,
        }
    }

    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    pub fn with_quota_delay(mut self, delay: Duration) -> Self {
        self.quota_delay = delay;
        self
    }

    /// Distill cases from the batch.
    ///
    /// Credentials are tried strictly in order and the first success wins.
    #[instrument(skip(self, candidates), fields(candidates = candidates.len(), keys = self.api_keys.len()))]
    pub async fn extract(&self, candidates: &[Candidate]) -> Extraction {
        if candidates.is_empty() {
            return Extraction::Cases(Vec::new());
        }

        let batch = &candidates[..candidates.len().min(self.max_candidates)];
        if batch.len() < candidates.len() {
            info!(
                kept = batch.len(),
                dropped = candidates.len() - batch.len(),
                "Candidate batch truncated"
            );
        }

        let prompt = build_prompt(batch);

        for (index, key) in self.api_keys.iter().enumerate() {
            let has_next = index + 1 < self.api_keys.len();

            match self.attempt(key, &prompt).await {
                Ok(raw) => {
                    let cases = resolve_cases(raw, batch);
                    info!(key_index = index, cases = cases.len(), "Extraction succeeded");
                    return Extraction::Cases(cases);
                }
                Err(e) if e.is_quota() => {
                    warn!(key_index = index, error = %e, "Model quota exhausted");
                    if has_next {
                        tokio::time::sleep(self.quota_delay).await;
                    }
                }
                Err(e) => {
                    warn!(key_index = index, error = %e, "Model call failed");
                }
            }
        }

        warn!("All model credentials failed");
        Extraction::Unavailable
    }

    async fn attempt(&self, key: &str, prompt: &str) -> Result<Vec<RawCase>, ModelError> {
        let text = self.model.generate_json(key, prompt).await?;
        parse_cases(&text)
    }
}

/// Attach origin URL and label to each record, dropping bad references
fn resolve_cases(raw: Vec<RawCase>, batch: &[Candidate]) -> Vec<ExtractedCase> {
    raw.into_iter()
        .filter_map(|case| {
            let Some(origin) = case.source_index().and_then(|i| batch.get(i)) else {
                debug!(source_id = %case.source_id, "Dropping case with invalid source reference");
                return None;
            };
            Some(to_extracted(case, origin))
        })
        .collect()
}

fn to_extracted(case: RawCase, origin: &Candidate) -> ExtractedCase {
    let profit_numeric = case.profit_numeric();
    let difficulty_score = case.difficulty();
    let tags = case.tag_list();

    ExtractedCase {
        title: non_empty(case.title).unwrap_or_else(|| origin.title.clone()),
        profit_description: non_empty(case.profit).unwrap_or_else(|| MISSING_PROFIT.to_string()),
        profit_numeric,
        category: non_empty(case.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        tags,
        difficulty_score,
        scheme: non_empty(case.scheme).unwrap_or_default(),
        stack: non_empty(case.stack).unwrap_or_default(),
        origin_url: origin.canonical_url.clone(),
        origin_label: origin.origin_label.clone(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
