//! RSS/Atom feed adapter
//!
//! Fetches syndication feeds and keeps entries published inside the window.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use casebot_core::text::strip_html;
use casebot_core::Candidate;

use crate::adapter::{FetchContext, SourceAdapter};
use crate::error::SourceError;

const LABEL: &str = "RSS";
const USER_AGENT: &str = "casebot/0.1";

/// RSS feed definition
#[derive(Debug, Clone)]
pub struct RssFeed {
    /// Name of the source, used in logs
    pub name: String,
    /// Feed URL
    pub url: String,
}

impl RssFeed {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Curated feeds covering AI monetization stories
pub fn get_curated_feeds() -> Vec<RssFeed> {
    vec![
        RssFeed::new("Medium: AI Monetization", "https://medium.com/feed/tag/ai-monetization"),
        RssFeed::new("Indie Hackers", "https://www.indiehackers.com/rss"),
    ]
}

/// An entry normalized across RSS and Atom
#[derive(Debug)]
struct FeedEntry {
    title: String,
    link: String,
    summary: String,
    published_at: Option<DateTime<Utc>>,
}

/// Syndication feed adapter
pub struct RssAdapter {
    feeds: Vec<RssFeed>,
    window: Duration,
}

impl RssAdapter {
    /// Create an adapter over the curated feeds
    pub fn new() -> Self {
        Self::with_feeds(get_curated_feeds())
    }

    /// Create with custom feeds
    pub fn with_feeds(feeds: Vec<RssFeed>) -> Self {
        Self {
            feeds,
            window: Duration::hours(24),
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Fetch a single feed
    async fn fetch_feed(
        &self,
        ctx: &FetchContext,
        feed: &RssFeed,
    ) -> Result<Vec<FeedEntry>, SourceError> {
        let response = ctx
            .http
            .get(&feed.url)
            .header("User-Agent", USER_AGENT)
            .timeout(ctx.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::ApiError {
                status: response.status().as_u16(),
                message: format!("Failed to fetch {}", feed.url),
            });
        }

        let content = response.bytes().await?;
        parse_feed(&content)
            .ok_or_else(|| SourceError::ParseError(format!("Failed to parse feed: {}", feed.url)))
    }
}

impl Default for RssAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for RssAdapter {
    fn name(&self) -> &str {
        LABEL
    }

    async fn fetch(&self, ctx: &FetchContext) -> Vec<Candidate> {
        let cutoff = ctx.now - self.window;
        let mut found = Vec::new();

        for feed in &self.feeds {
            match self.fetch_feed(ctx, feed).await {
                Ok(entries) => {
                    debug!(feed = %feed.name, entries = entries.len(), "Fetched feed");
                    found.extend(
                        entries
                            .into_iter()
                            .filter(|e| e.published_at.is_some_and(|at| at > cutoff))
                            .map(|e| Candidate::new(e.title, &e.summary, e.link, LABEL)),
                    );
                }
                Err(e) => {
                    warn!(feed = %feed.name, error = %e, "Failed to fetch feed");
                }
            }
        }

        let kept = ctx.retain_new(found).await;
        info!(source = LABEL, count = kept.len(), "Fetched candidates");
        kept
    }
}

/// Try parsing as RSS first, then Atom
fn parse_feed(content: &[u8]) -> Option<Vec<FeedEntry>> {
    if let Ok(channel) = rss::Channel::read_from(content) {
        return Some(parse_rss_channel(&channel));
    }

    if let Ok(atom_feed) = atom_syndication::Feed::read_from(content) {
        return Some(parse_atom_feed(&atom_feed));
    }

    None
}

fn parse_rss_channel(channel: &rss::Channel) -> Vec<FeedEntry> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = item.title()?.trim().to_string();
            let link = item.link()?.trim().to_string();
            let published_at = item
                .pub_date()
                .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                .map(|d| d.with_timezone(&Utc));

            Some(FeedEntry {
                title,
                link,
                summary: strip_html(item.description().unwrap_or_default()),
                published_at,
            })
        })
        .collect()
}

fn parse_atom_feed(atom_feed: &atom_syndication::Feed) -> Vec<FeedEntry> {
    atom_feed
        .entries()
        .iter()
        .filter_map(|entry| {
            let link = entry.links().first()?.href().trim().to_string();
            if link.is_empty() {
                return None;
            }

            let published_at = entry
                .published()
                .copied()
                .unwrap_or_else(|| *entry.updated())
                .with_timezone(&Utc);

            let summary_html = entry.summary().map(|s| s.as_str()).unwrap_or_default();
            let content_html = entry.content().and_then(|c| c.value()).unwrap_or_default();
            let summary = if !summary_html.is_empty() {
                strip_html(summary_html)
            } else {
                strip_html(content_html)
            };

            Some(FeedEntry {
                title: entry.title().to_string(),
                link,
                summary,
                published_at: Some(published_at),
            })
        })
        .collect()
}
