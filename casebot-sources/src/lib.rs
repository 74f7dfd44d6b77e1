//! Source adapters for AI monetization case candidates
//!
//! This crate provides one adapter per origin:
//! - Hacker News: Algolia story search
//! - GitHub: recently created repositories tagged `ai`, by stars
//! - Reddit: keyword search across several communities
//! - RSS/Atom: syndication feeds
//!
//! Every adapter filters its output through the shared [`DuplicateFilter`]
//! and never fails past its own boundary.

pub mod adapter;
pub mod dedup;
pub mod error;
pub mod github;
pub mod hacker_news;
pub mod rate_limiter;
pub mod reddit;
pub mod rss_client;

pub use adapter::{FetchContext, SourceAdapter};
pub use dedup::DuplicateFilter;
pub use error::SourceError;
pub use github::GitHubAdapter;
pub use hacker_news::HackerNewsAdapter;
pub use rate_limiter::RateLimiter;
pub use reddit::RedditAdapter;
pub use rss_client::{get_curated_feeds, RssAdapter, RssFeed};

/// The default adapter set, in the order their results are concatenated
pub fn default_adapters() -> Vec<Box<dyn SourceAdapter>> {
    vec![
        Box::new(HackerNewsAdapter::new()),
        Box::new(GitHubAdapter::new()),
        Box::new(RedditAdapter::new()),
        Box::new(RssAdapter::new()),
    ]
}
