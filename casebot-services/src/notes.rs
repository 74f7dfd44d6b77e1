//! Markdown note per case, for an Obsidian-style vault

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use casebot_core::{CaseBotError, CaseBotResult, ExtractedCase};

/// Longest title fragment used in a file name, in characters
pub const MAX_TITLE_CHARS: usize = 50;

const UNSAFE_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];
const FALLBACK_TITLE: &str = "case";

/// Strip filesystem-unsafe characters and cap the length
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !UNSAFE_CHARS.contains(c) && !c.is_control())
        .take(MAX_TITLE_CHARS)
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Writes one note file per case into a directory
#[derive(Debug, Clone)]
pub struct NoteWriter {
    dir: PathBuf,
}

impl NoteWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File name for a case observed at `at`
    pub fn file_name(case: &ExtractedCase, at: DateTime<Utc>) -> String {
        format!("{}_{}.md", at.format("%Y-%m-%d"), sanitize_title(&case.title))
    }

    /// Write the note, replacing any same-named file. Returns its path.
    #[instrument(skip(self, case), fields(url = %case.origin_url))]
    pub async fn write(&self, case: &ExtractedCase, at: DateTime<Utc>) -> CaseBotResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            CaseBotError::storage(format!("Cannot create {}: {e}", self.dir.display()))
        })?;

        let path = self.dir.join(Self::file_name(case, at));
        tokio::fs::write(&path, render_note(case, at))
            .await
            .map_err(|e| CaseBotError::storage(format!("Cannot write {}: {e}", path.display())))?;

        debug!(path = %path.display(), "Note written");
        Ok(path)
    }
}

fn yaml_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| String::from("\"\""))
}

fn render_note(case: &ExtractedCase, at: DateTime<Utc>) -> String {
    let tags = serde_json::to_string(&case.tags).unwrap_or_else(|_| String::from("[]"));
    let profit = case.profit_numeric.unwrap_or(Decimal::ZERO);

    format!(
        "---\n\
         type: ai-money-case\n\
         date: {date}\n\
         category: {category}\n\
         profit: {profit}\n\
         difficulty: {difficulty}\n\
         source_url: {url}\n\
         tags: {tags}\n\
         ---\n\
         # {title}\n\
         \n\
         ## 💰 Profit Description\n\
         {profit_description}\n\
         \n\
         ## 🛠 Tech Stack\n\
         `{stack}`\n\
         \n\
         ## 📝 Implementation Scheme\n\
         {scheme}\n\
         \n\
         ## 🔗 Source\n\
         [{label}]({url_raw})\n",
        date = at.to_rfc3339_opts(SecondsFormat::Secs, true),
        category = yaml_string(&case.category),
        profit = profit,
        difficulty = case.difficulty_score,
        url = yaml_string(&case.origin_url),
        tags = tags,
        title = case.title,
        profit_description = case.profit_description,
        stack = case.stack,
        scheme = case.scheme,
        label = case.origin_label,
        url_raw = case.origin_url,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn case(title: &str) -> ExtractedCase {
        ExtractedCase {
            title: title.to_string(),
            profit_description: "About $2k a month".to_string(),
            profit_numeric: Some(Decimal::from_str("2000").unwrap()),
            category: "SaaS".to_string(),
            tags: vec!["ai".to_string(), "saas".to_string()],
            difficulty_score: 6,
            scheme: "1. Build\n2. Sell".to_string(),
            stack: "Next.js, OpenAI".to_string(),
            origin_url: "https://example.com/case".to_string(),
            origin_label: "Reddit (r/SaaS)".to_string(),
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title(r#"AI: "Money" <bot>/v2?*|\"#), "AI Money botv2");
        assert_eq!(sanitize_title(&"a".repeat(80)).chars().count(), MAX_TITLE_CHARS);
        assert_eq!(sanitize_title("???"), "case");
        assert_eq!(sanitize_title("Кейс: бот"), "Кейс бот");
    }

    #[test]
    fn test_file_name_is_date_prefixed() {
        assert_eq!(
            NoteWriter::file_name(&case("My case"), at()),
            "2026-10-14_My case.md"
        );
    }

    #[tokio::test]
    async fn test_write_creates_directory_and_front_matter() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = NoteWriter::new(tmp.path().join("vault").join("cases"));

        let path = writer.write(&case("Telegram bot"), at()).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(content.starts_with("---\ntype: ai-money-case\n"));
        assert!(content.contains("date: 2026-10-14T09:30:00Z"));
        assert!(content.contains("profit: 2000"));
        assert!(content.contains("difficulty: 6"));
        assert!(content.contains("source_url: \"https://example.com/case\""));
        assert!(content.contains("tags: [\"ai\",\"saas\"]"));
        assert!(content.contains("# Telegram bot\n"));
        assert!(content.contains("`Next.js, OpenAI`"));
        assert!(content.contains("[Reddit (r/SaaS)](https://example.com/case)"));
    }

    #[tokio::test]
    async fn test_rewrite_replaces_same_file() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = NoteWriter::new(tmp.path());

        let first = writer.write(&case("Same"), at()).await.unwrap();
        let mut updated = case("Same");
        updated.stack = "Rust".to_string();
        let second = writer.write(&updated, at()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
        assert!(std::fs::read_to_string(second).unwrap().contains("`Rust`"));
    }
}
