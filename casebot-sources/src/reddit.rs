//! Reddit keyword search across several communities
//!
//! Communities are fetched concurrently. Requests to the host share one
//! [`RateLimiter`], so pacing stays serialized even under fan-out.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use casebot_core::Candidate;

use crate::adapter::{FetchContext, SourceAdapter};
use crate::error::SourceError;
use crate::rate_limiter::RateLimiter;

const REDDIT_URL: &str = "https://www.reddit.com";
const USER_AGENT: &str = "Mozilla/5.0 (AI Money Bot 2.0)";
const DEFAULT_PACING: StdDuration = StdDuration::from_secs(1);

const SUBREDDITS: &[&str] = &[
    "SideProject",
    "SaaS",
    "Entrepreneur",
    "AiMoneyMaking",
    "IndieHackers",
    "solopreneur",
];

const SEARCH_QUERIES: &[&str] = &["AI revenue", "AI MRR", "AI profit", "AI case study"];

/// Communities read through their `new` listing instead of keyword search
const LISTING_SUBREDDITS: &[&str] = &["AiMoneyMaking"];

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
    #[serde(default)]
    selftext: String,
    permalink: String,
    created_utc: f64,
}

/// One request against a community
#[derive(Debug, Clone)]
enum SubQuery {
    Search(String),
    Listing,
}

/// Posts from monetization-focused communities
pub struct RedditAdapter {
    base_url: String,
    subreddits: Vec<String>,
    queries: Vec<String>,
    window: Duration,
    limiter: Arc<RateLimiter>,
}

impl RedditAdapter {
    pub fn new() -> Self {
        Self {
            base_url: REDDIT_URL.to_string(),
            subreddits: SUBREDDITS.iter().map(|s| s.to_string()).collect(),
            queries: SEARCH_QUERIES.iter().map(|s| s.to_string()).collect(),
            window: Duration::hours(24),
            limiter: Arc::new(RateLimiter::new(DEFAULT_PACING, "reddit")),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_subreddits(mut self, subreddits: &[&str]) -> Self {
        self.subreddits = subreddits.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_queries(mut self, queries: &[&str]) -> Self {
        self.queries = queries.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_pacing(mut self, interval: StdDuration) -> Self {
        self.limiter = Arc::new(RateLimiter::new(interval, "reddit"));
        self
    }

    fn sub_queries(&self, subreddit: &str) -> Vec<SubQuery> {
        if LISTING_SUBREDDITS.contains(&subreddit) {
            vec![SubQuery::Listing]
        } else {
            self.queries.iter().cloned().map(SubQuery::Search).collect()
        }
    }

    /// All recent posts for one community; failing sub-queries count as empty.
    async fn fetch_subreddit(&self, ctx: &FetchContext, subreddit: &str) -> Vec<Candidate> {
        let cutoff = ctx.now - self.window;
        let mut found = Vec::new();

        for sub_query in self.sub_queries(subreddit) {
            self.limiter.acquire().await;
            match self.fetch_posts(ctx, subreddit, &sub_query).await {
                Ok(posts) => {
                    found.extend(
                        posts
                            .into_iter()
                            .filter(|post| is_recent(post.created_utc, cutoff))
                            .map(|post| to_candidate(post, subreddit)),
                    );
                }
                Err(SourceError::RateLimited) => {
                    debug!(subreddit, query = ?sub_query, "Throttled, skipping sub-query");
                }
                Err(e) => {
                    warn!(subreddit, query = ?sub_query, error = %e, "Reddit sub-query failed");
                }
            }
        }

        found
    }

    async fn fetch_posts(
        &self,
        ctx: &FetchContext,
        subreddit: &str,
        sub_query: &SubQuery,
    ) -> Result<Vec<Post>, SourceError> {
        let request = match sub_query {
            SubQuery::Listing => ctx
                .http
                .get(format!("{}/r/{subreddit}/new.json", self.base_url))
                .query(&[("limit", "10")]),
            SubQuery::Search(q) => ctx
                .http
                .get(format!("{}/r/{subreddit}/search.json", self.base_url))
                .query(&[
                    ("q", q.as_str()),
                    ("sort", "new"),
                    ("restrict_sr", "1"),
                    ("limit", "5"),
                ]),
        }
        .header("User-Agent", USER_AGENT);

        let listing: Listing = ctx.get_json(request).await?;
        Ok(listing.data.children.into_iter().map(|c| c.data).collect())
    }

    #[instrument(skip(self, ctx))]
    async fn collect(&self, ctx: &FetchContext) -> Vec<Candidate> {
        let per_subreddit =
            join_all(self.subreddits.iter().map(|sub| self.fetch_subreddit(ctx, sub))).await;

        collapse_by_url(per_subreddit.into_iter().flatten())
    }
}

impl Default for RedditAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for RedditAdapter {
    fn name(&self) -> &str {
        "Reddit"
    }

    async fn fetch(&self, ctx: &FetchContext) -> Vec<Candidate> {
        let merged = self.collect(ctx).await;
        let kept = ctx.retain_new(merged).await;
        info!(source = "Reddit", count = kept.len(), "Fetched candidates");
        kept
    }
}

fn is_recent(created_utc: f64, cutoff: DateTime<Utc>) -> bool {
    DateTime::from_timestamp(created_utc as i64, 0)
        .map(|created| created > cutoff)
        .unwrap_or(false)
}

fn to_candidate(post: Post, subreddit: &str) -> Candidate {
    Candidate::new(
        post.title,
        &post.selftext,
        format!("{REDDIT_URL}{}", post.permalink),
        format!("Reddit (r/{subreddit})"),
    )
}

/// Collapse candidates sharing a URL; the first occurrence wins.
fn collapse_by_url(candidates: impl IntoIterator<Item = Candidate>) -> Vec<Candidate> {
    let mut by_url: IndexMap<String, Candidate> = IndexMap::new();
    for candidate in candidates {
        by_url
            .entry(candidate.canonical_url.clone())
            .or_insert(candidate);
    }
    by_url.into_values().collect()
}
