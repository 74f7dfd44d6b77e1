//! GitHub repository search for freshly created AI projects

use async_trait::async_trait;
use chrono::Duration;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use casebot_core::Candidate;

use crate::adapter::{FetchContext, SourceAdapter};
use crate::error::SourceError;

const GITHUB_API_URL: &str = "https://api.github.com";
const LABEL: &str = "GitHub";
const USER_AGENT: &str = "casebot/0.1";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    name: String,
    html_url: String,
    description: Option<String>,
}

/// Trending repositories under the `ai` topic
pub struct GitHubAdapter {
    base_url: String,
    window: Duration,
    limit: usize,
}

impl GitHubAdapter {
    pub fn new() -> Self {
        Self {
            base_url: GITHUB_API_URL.to_string(),
            window: Duration::hours(48),
            limit: 10,
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    #[instrument(skip(self, ctx))]
    async fn search(&self, ctx: &FetchContext) -> Result<Vec<Candidate>, SourceError> {
        let created_after = (ctx.now - self.window).format("%Y-%m-%d");
        let q = format!("topic:ai created:>{created_after}");
        let request = ctx
            .http
            .get(format!("{}/search/repositories", self.base_url))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .query(&[("q", q.as_str()), ("sort", "stars"), ("order", "desc")]);

        let response: SearchResponse = ctx.get_json(request).await?;

        Ok(response
            .items
            .into_iter()
            .take(self.limit)
            .map(|repo| {
                let description = repo
                    .description
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| "No description".to_string());
                Candidate::new(format!("GH: {}", repo.name), &description, repo.html_url, LABEL)
            })
            .collect())
    }
}

impl Default for GitHubAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for GitHubAdapter {
    fn name(&self) -> &str {
        LABEL
    }

    async fn fetch(&self, ctx: &FetchContext) -> Vec<Candidate> {
        match self.search(ctx).await {
            Ok(found) => {
                let kept = ctx.retain_new(found).await;
                info!(source = LABEL, count = kept.len(), "Fetched candidates");
                kept
            }
            Err(e) => {
                warn!(source = LABEL, error = %e, "Source fetch failed");
                Vec::new()
            }
        }
    }
}
