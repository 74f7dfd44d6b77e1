//! Process configuration, read once at startup

use std::path::PathBuf;
use std::time::Duration;

use casebot_services::SupabaseConfig;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_SUPABASE_TABLE: &str = casebot_services::supabase::DEFAULT_TABLE;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_keys: Vec<String>,
    pub gemini_model: String,
    pub telegram: Option<TelegramConfig>,
    pub supabase: Option<SupabaseConfig>,
    pub notes_dir: Option<PathBuf>,
    /// Ledger rows older than this no longer count as seen
    pub seen_url_retention: Option<chrono::Duration>,
    pub max_candidates: usize,
    pub quota_retry_delay: Duration,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let gemini_api_keys: Vec<String> = get("GEMINI_API_KEYS")
            .or_else(|| get("GEMINI_API_KEY"))
            .map(|raw| {
                raw.split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if gemini_api_keys.is_empty() {
            return Err(ConfigError::MissingVar("GEMINI_API_KEYS".to_string()));
        }

        let telegram = pair(&get, "TELEGRAM_BOT_TOKEN", "TELEGRAM_CHAT_ID")
            .map(|(bot_token, chat_id)| TelegramConfig { bot_token, chat_id });

        let supabase = pair(&get, "SUPABASE_URL", "SUPABASE_KEY").map(|(url, key)| SupabaseConfig {
            url,
            key,
            table: get("SUPABASE_TABLE").unwrap_or_else(|| DEFAULT_SUPABASE_TABLE.to_string()),
        });

        let seen_url_retention = match get("SEEN_URL_RETENTION_DAYS") {
            Some(raw) => {
                let days: i64 = parse_number("SEEN_URL_RETENTION_DAYS", &raw)?;
                if days <= 0 {
                    return Err(invalid("SEEN_URL_RETENTION_DAYS", "must be positive"));
                }
                Some(
                    chrono::Duration::try_days(days)
                        .ok_or_else(|| invalid("SEEN_URL_RETENTION_DAYS", "out of range"))?,
                )
            }
            None => None,
        };

        let max_candidates = match get("MAX_CANDIDATES") {
            Some(raw) => parse_number::<usize>("MAX_CANDIDATES", &raw)?,
            None => casebot_research::DEFAULT_MAX_CANDIDATES,
        };
        if max_candidates == 0 {
            return Err(invalid("MAX_CANDIDATES", "must be at least 1"));
        }

        let quota_retry_delay = match get("QUOTA_RETRY_DELAY_SECS") {
            Some(raw) => Duration::from_secs(parse_number("QUOTA_RETRY_DELAY_SECS", &raw)?),
            None => casebot_research::DEFAULT_QUOTA_DELAY,
        };

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = parse_number("HTTP_TIMEOUT_SECS", &raw)?;
                if secs == 0 {
                    return Err(invalid("HTTP_TIMEOUT_SECS", "must be at least 1"));
                }
                Duration::from_secs(secs)
            }
            None => casebot_sources::adapter::DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            gemini_api_keys,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            telegram,
            supabase,
            notes_dir: get("NOTES_DIR")
                .or_else(|| get("OBSIDIAN_DB_PATH"))
                .map(PathBuf::from),
            seen_url_retention,
            max_candidates,
            quota_retry_delay,
            http_timeout,
        })
    }

    /// Log the effective configuration without secrets
    pub fn log_summary(&self) {
        info!(
            gemini_keys = self.gemini_api_keys.len(),
            model = %self.gemini_model,
            telegram = self.telegram.is_some(),
            supabase = self.supabase.is_some(),
            table = self.supabase.as_ref().map(|s| s.table.as_str()).unwrap_or("-"),
            notes_dir = %self
                .notes_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string()),
            retention_days = self.seen_url_retention.map(|d| d.num_days()),
            max_candidates = self.max_candidates,
            quota_retry_delay_secs = self.quota_retry_delay.as_secs(),
            http_timeout_secs = self.http_timeout.as_secs(),
            "Configuration loaded"
        );
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse()
        .map_err(|_| invalid(key, &format!("`{raw}` is not a valid number")))
}

/// A collaborator configured by two variables. With only one of them set
/// the collaborator is disabled.
fn pair<G>(get: &G, first: &str, second: &str) -> Option<(String, String)>
where
    G: Fn(&str) -> Option<String>,
{
    match (get(first), get(second)) {
        (Some(a), Some(b)) => Some((a, b)),
        (None, None) => None,
        (Some(_), None) => {
            warn!(present = first, missing = second, "Incomplete credentials, disabling");
            None
        }
        (None, Some(_)) => {
            warn!(present = second, missing = first, "Incomplete credentials, disabling");
            None
        }
    }
}
