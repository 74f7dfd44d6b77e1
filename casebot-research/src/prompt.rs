//! Extraction prompt and model-response parsing

use std::str::FromStr;

use casebot_core::text::truncate_chars;
use casebot_core::Candidate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ModelError;

/// Excerpt length per candidate inside the prompt
pub const PROMPT_EXCERPT_CHARS: usize = 1000;

/// Difficulty used when the model omits a usable score
const DEFAULT_DIFFICULTY: i64 = 5;

/// Build the single-batch extraction prompt.
///
/// Each candidate is listed as `SOURCE {i}` where `i` is its position in
/// `candidates`; the model must echo that position back as `source_id`.
pub fn build_prompt(candidates: &[Candidate]) -> String {
    let context = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "SOURCE {}: {} | URL: {} | TEXT: {}",
                i,
                c.title,
                c.canonical_url,
                truncate_chars(&c.excerpt, PROMPT_EXCERPT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"ANALYSIS TASK: Identify 2-3 REAL AI monetization cases from the context below.
Only pick sources that describe a concrete product or service earning money with AI.

CONTEXT:
{context}

Return ONLY a JSON array, no prose. Each element:
{{
  "source_id": <number of the SOURCE the case comes from>,
  "title": "Short case title",
  "profit": "Profit as described, e.g. $4k MRR",
  "profit_num": 4000,
  "category": "SaaS | Content | Agency | Tool | Other",
  "tags": ["tag1", "tag2"],
  "difficulty_score": <integer 1-10>,
  "scheme": "Step-by-step monetization scheme",
  "stack": "Tools used"
}}

Use null for profit_num when no number is given. Never invent a source_id."#
    )
}

/// Strip a fenced code block wrapper from a model response
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// One case object as the model returned it.
///
/// Fields the model tends to get loosely typed are kept as raw JSON and
/// normalized through the accessor methods.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCase {
    pub source_id: Value,
    pub title: Option<String>,
    pub profit: Option<String>,
    pub profit_num: Value,
    pub category: Option<String>,
    pub tags: Value,
    pub difficulty_score: Value,
    pub scheme: Option<String>,
    pub stack: Option<String>,
}

impl RawCase {
    /// Position of the candidate this case refers to, if the model gave one
    pub fn source_index(&self) -> Option<usize> {
        match &self.source_id {
            Value::Number(n) => n.as_u64().and_then(|i| usize::try_from(i).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Numeric profit from a number or a numeric string like `"$1,200"`
    pub fn profit_numeric(&self) -> Option<Decimal> {
        match &self.profit_num {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Decimal::from(i))
                } else {
                    n.as_f64().and_then(|f| Decimal::try_from(f).ok())
                }
            }
            Value::String(s) => {
                let cleaned: String = s
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != '$' && *c != ',')
                    .collect();
                Decimal::from_str(&cleaned).ok()
            }
            _ => None,
        }
    }

    /// Difficulty clamped into the valid range, defaulting to the midpoint
    pub fn difficulty(&self) -> u8 {
        let score = match &self.difficulty_score {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.round() as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        casebot_core::ExtractedCase::clamp_difficulty(score.unwrap_or(DEFAULT_DIFFICULTY))
    }

    /// Trimmed, non-empty tags with duplicates removed, order kept.
    /// A single comma separated string is split.
    pub fn tag_list(&self) -> Vec<String> {
        let raw: Vec<String> = match &self.tags {
            Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Value::String(s) => s.split(',').map(str::to_string).collect(),
            _ => Vec::new(),
        };

        let mut tags: Vec<String> = Vec::with_capacity(raw.len());
        for tag in raw {
            let tag = tag.trim().trim_start_matches('#').trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
        tags
    }
}

/// Parse the model's text into raw case records.
///
/// Accepts a bare array or an object carrying a `cases` array. Records that
/// fail to deserialize are dropped individually.
pub fn parse_cases(text: &str) -> Result<Vec<RawCase>, ModelError> {
    let json = strip_code_blocks(text);
    let value: Value =
        serde_json::from_str(json).map_err(|e| ModelError::MalformedJson(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("cases") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ModelError::MalformedJson(
                    "Expected a JSON array of cases".to_string(),
                ))
            }
        },
        _ => {
            return Err(ModelError::MalformedJson(
                "Expected a JSON array of cases".to_string(),
            ))
        }
    };

    let total = items.len();
    let cases: Vec<RawCase> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawCase>(item) {
            Ok(case) => Some(case),
            Err(e) => {
                debug!(error = %e, "Dropping malformed case record");
                None
            }
        })
        .collect();

    if cases.len() < total {
        debug!(kept = cases.len(), total, "Some case records were malformed");
    }

    Ok(cases)
}
