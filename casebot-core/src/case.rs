//! Extracted monetization cases and their persisted form

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lowest difficulty score a case can carry
pub const MIN_DIFFICULTY: u8 = 1;
/// Highest difficulty score a case can carry
pub const MAX_DIFFICULTY: u8 = 10;

/// The model's structured judgment about one candidate, resolved back to
/// the candidate it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedCase {
    pub title: String,
    /// Free-text profit claim, e.g. "$4k MRR after 3 months"
    pub profit_description: String,
    /// Numeric profit when the model could pin one down
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub profit_numeric: Option<Decimal>,
    pub category: String,
    pub tags: Vec<String>,
    /// Always within `MIN_DIFFICULTY..=MAX_DIFFICULTY`
    pub difficulty_score: u8,
    /// Step-by-step implementation scheme
    pub scheme: String,
    /// Tools used
    pub stack: String,
    /// Canonical URL of the originating candidate
    pub origin_url: String,
    /// Source label of the originating candidate
    pub origin_label: String,
}

impl ExtractedCase {
    /// Clamp an arbitrary model-supplied score into the valid range.
    pub fn clamp_difficulty(score: i64) -> u8 {
        score.clamp(MIN_DIFFICULTY as i64, MAX_DIFFICULTY as i64) as u8
    }
}

/// Row shape of the case table, keyed by `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCase {
    pub url: String,
    pub title: String,
    pub profit: String,
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub profit_num: Option<Decimal>,
    pub category: String,
    pub tags: Vec<String>,
    pub difficulty_score: u8,
    pub scheme: String,
    pub stack: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl StoredCase {
    pub fn from_case(case: &ExtractedCase, observed_at: DateTime<Utc>) -> Self {
        Self {
            url: case.origin_url.clone(),
            title: case.title.clone(),
            profit: case.profit_description.clone(),
            profit_num: case.profit_numeric,
            category: case.category.clone(),
            tags: case.tags.clone(),
            difficulty_score: case.difficulty_score,
            scheme: case.scheme.clone(),
            stack: case.stack.clone(),
            source: case.origin_label.clone(),
            created_at: observed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_clamp_difficulty() {
        assert_eq!(ExtractedCase::clamp_difficulty(0), 1);
        assert_eq!(ExtractedCase::clamp_difficulty(-4), 1);
        assert_eq!(ExtractedCase::clamp_difficulty(7), 7);
        assert_eq!(ExtractedCase::clamp_difficulty(11), 10);
    }

    #[test]
    fn test_stored_case_column_names() {
        let case = ExtractedCase {
            title: "Newsletter bot".to_string(),
            profit_description: "$1,200/mo".to_string(),
            profit_numeric: Some(Decimal::from_str("1200").unwrap()),
            category: "SaaS".to_string(),
            tags: vec!["newsletter".to_string()],
            difficulty_score: 4,
            scheme: "1. Scrape 2. Summarize".to_string(),
            stack: "Python, GPT-4".to_string(),
            origin_url: "https://example.com/post".to_string(),
            origin_label: "Hacker News".to_string(),
        };
        let row = StoredCase::from_case(&case, Utc::now());
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["url"], "https://example.com/post");
        assert_eq!(json["profit"], "$1,200/mo");
        assert_eq!(json["profit_num"], 1200.0);
        assert_eq!(json["source"], "Hacker News");
        assert_eq!(json["difficulty_score"], 4);
    }
}
