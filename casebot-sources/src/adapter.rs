//! Adapter contract shared by all sources

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use casebot_core::Candidate;

use crate::dedup::DuplicateFilter;
use crate::error::SourceError;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything an adapter needs for one run
#[derive(Clone)]
pub struct FetchContext {
    /// Shared HTTP client
    pub http: Client,
    /// Ledger check applied before a candidate is kept
    pub filter: DuplicateFilter,
    /// Single reference instant for every time window in the run
    pub now: DateTime<Utc>,
    /// Timeout applied to each outbound request
    pub timeout: Duration,
}

impl FetchContext {
    pub fn new(http: Client, filter: DuplicateFilter) -> Self {
        Self {
            http,
            filter,
            now: Utc::now(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Drop candidates whose URL is already in the ledger, keeping order.
    pub async fn retain_new(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let mut kept = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if self.filter.is_duplicate(&candidate.canonical_url, self.now).await {
                debug!(url = %candidate.canonical_url, "Skipping already processed item");
                continue;
            }
            kept.push(candidate);
        }
        kept
    }

    /// Send a GET request with the run timeout and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, SourceError> {
        let response = request.timeout(self.timeout).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }
        if !status.is_success() {
            return Err(SourceError::ApiError {
                status: status.as_u16(),
                message: format!("Unexpected status from {}", response.url()),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))
    }
}

/// A fetcher for one origin.
///
/// `fetch` never fails: network, parse, and shape errors are logged by the
/// adapter and yield a partial (possibly empty) list.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Fetch recent, not-yet-seen candidates.
    async fn fetch(&self, ctx: &FetchContext) -> Vec<Candidate>;
}
