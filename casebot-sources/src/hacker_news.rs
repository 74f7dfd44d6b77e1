//! Hacker News story search via the Algolia API

use async_trait::async_trait;
use chrono::Duration;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use casebot_core::text::strip_html;
use casebot_core::Candidate;

use crate::adapter::{FetchContext, SourceAdapter};
use crate::error::SourceError;

const HN_API_URL: &str = "https://hn.algolia.com/api/v1";
const HN_ITEM_URL: &str = "https://news.ycombinator.com/item?id=";
const HN_QUERY: &str = "AI revenue OR AI profit OR AI SaaS OR AI MRR";
const LABEL: &str = "Hacker News";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "objectID")]
    object_id: String,
    title: Option<String>,
    url: Option<String>,
    story_text: Option<String>,
}

/// Recent stories matching monetization keywords
pub struct HackerNewsAdapter {
    base_url: String,
    query: String,
    window: Duration,
}

impl HackerNewsAdapter {
    pub fn new() -> Self {
        Self {
            base_url: HN_API_URL.to_string(),
            query: HN_QUERY.to_string(),
            window: Duration::hours(24),
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
        let since = (ctx.now - self.window).timestamp();
        let numeric_filter = format!("created_at_i>{since}");
        let request = ctx.http.get(format!("{}/search", self.base_url)).query(&[
            ("query", self.query.as_str()),
            ("tags", "story"),
            ("numericFilters", numeric_filter.as_str()),
        ]);

        let response: SearchResponse = ctx.get_json(request).await?;

        Ok(response
            .hits
            .into_iter()
            .filter_map(|hit| {
                let title = hit.title.filter(|t| !t.trim().is_empty())?;
                let url = hit
                    .url
                    .filter(|u| !u.is_empty())
                    .unwrap_or_else(|| format!("{HN_ITEM_URL}{}", hit.object_id));
                let text = strip_html(hit.story_text.as_deref().unwrap_or_default());
                Some(Candidate::new(title, &text, url, LABEL))
            })
            .collect())
    }
}

impl Default for HackerNewsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for HackerNewsAdapter {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::DuplicateFilter;
    use serde_json::json;
    use std::time::{Duration as StdDuration, Instant};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx() -> FetchContext {
        FetchContext::new(reqwest::Client::new(), DuplicateFilter::disabled())
    }

    #[tokio::test]
    async fn test_maps_hits_to_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("tags", "story"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": [
                    {"objectID": "1", "title": "Show HN: $3k MRR", "url": "https://a.example/post", "story_text": null},
                    {"objectID": "42", "title": "Ask HN: AI profit?", "story_text": "<p>How do you <i>earn</i>?</p>"},
                    {"objectID": "7", "title": null}
                ]
            })))
            .mount(&server)
            .await;

        let adapter = HackerNewsAdapter::new().with_base_url(&server.uri());
        let found = adapter.fetch(&ctx()).await;

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].canonical_url, "https://a.example/post");
        assert_eq!(found[0].origin_label, "Hacker News");
        assert_eq!(found[1].canonical_url, "https://news.ycombinator.com/item?id=42");
        assert_eq!(found[1].excerpt, "How do you earn?");
    }

    #[tokio::test]
    async fn test_server_error_yields_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let adapter = HackerNewsAdapter::new().with_base_url(&server.uri());
        assert!(adapter.fetch(&ctx()).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_yields_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let adapter = HackerNewsAdapter::new().with_base_url(&server.uri());
        assert!(adapter.fetch(&ctx()).await.is_empty());
    }

    #[tokio::test]
    async fn test_unresponsive_source_times_out_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"hits": []}))
                    .set_delay(StdDuration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let adapter = HackerNewsAdapter::new().with_base_url(&server.uri());
        let ctx = ctx().with_timeout(StdDuration::from_millis(200));

        let start = Instant::now();
        let found = adapter.fetch(&ctx).await;

        assert!(found.is_empty());
        assert!(start.elapsed() < StdDuration::from_secs(2));
    }
}
