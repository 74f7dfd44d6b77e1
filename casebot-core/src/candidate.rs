//! Normalized candidate items produced by source adapters

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::text::truncate_chars;

/// Upper bound on excerpt length, in characters
pub const MAX_EXCERPT_CHARS: usize = 2000;

/// A normalized mention of a potential case, not yet judged by the model.
///
/// Two candidates with the same `canonical_url` are the same item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Short hash of the canonical URL, used for log correlation
    pub id: String,
    /// Post or repository title
    pub title: String,
    /// Body text, at most [`MAX_EXCERPT_CHARS`] characters
    pub excerpt: String,
    /// Identity key for deduplication and persistence
    pub canonical_url: String,
    /// Human-readable source name, e.g. "Reddit (r/SaaS)"
    pub origin_label: String,
}

impl Candidate {
    pub fn new(
        title: impl Into<String>,
        excerpt: &str,
        canonical_url: impl Into<String>,
        origin_label: impl Into<String>,
    ) -> Self {
        let canonical_url = canonical_url.into();
        Self {
            id: url_id(&canonical_url),
            title: title.into(),
            excerpt: truncate_chars(excerpt, MAX_EXCERPT_CHARS),
            canonical_url,
            origin_label: origin_label.into(),
        }
    }
}

fn url_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(&hasher.finalize()[..8])
}
