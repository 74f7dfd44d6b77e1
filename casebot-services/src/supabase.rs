//! Supabase (PostgREST) case table

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use casebot_core::{CaseBotError, CaseBotResult, CaseStore, StoredCase};

pub const DEFAULT_TABLE: &str = "ai_money_cases";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Service or anon key
    pub key: String,
    pub table: String,
}

#[derive(Debug, Deserialize)]
struct UrlRow {
    url: String,
}

/// [`CaseStore`] backed by a Supabase table with a unique `url` column
pub struct SupabaseStore {
    http: Client,
    endpoint: String,
    key: String,
    timeout: Duration,
}

impl SupabaseStore {
    pub fn new(http: Client, config: SupabaseConfig) -> CaseBotResult<Self> {
        let base = Url::parse(&config.url)
            .map_err(|e| CaseBotError::config(format!("Invalid Supabase URL: {e}")))?;
        let endpoint = format!(
            "{}/rest/v1/{}",
            base.as_str().trim_end_matches('/'),
            urlencoding::encode(&config.table)
        );

        Ok(Self {
            http,
            endpoint,
            key: config.key,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .timeout(self.timeout)
    }
}

fn postgrest_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl CaseStore for SupabaseStore {
    #[instrument(skip(self))]
    async fn contains_url(&self, url: &str, since: Option<DateTime<Utc>>) -> CaseBotResult<bool> {
        let mut query = vec![
            ("select", "url".to_string()),
            ("url", format!("eq.{url}")),
        ];
        if let Some(since) = since {
            query.push(("created_at", format!("gte.{}", postgrest_timestamp(since))));
        }
        query.push(("limit", "1".to_string()));

        let resp = self
            .authorized(self.http.get(&self.endpoint))
            .query(&query)
            .send()
            .await
            .map_err(|e| CaseBotError::network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CaseBotError::storage(format!(
                "Lookup failed ({status}): {body}"
            )));
        }

        let rows: Vec<UrlRow> = resp
            .json()
            .await
            .map_err(|e| CaseBotError::parse(e.to_string()))?;
        let found = rows.iter().any(|row| row.url == url);
        debug!(found, "URL lookup");
        Ok(found)
    }

    #[instrument(skip(self, case), fields(url = %case.url))]
    async fn upsert_case(&self, case: &StoredCase) -> CaseBotResult<()> {
        let resp = self
            .authorized(self.http.post(&self.endpoint))
            .query(&[("on_conflict", "url")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[case])
            .send()
            .await
            .map_err(|e| CaseBotError::network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CaseBotError::storage(format!(
                "Upsert failed ({status}): {body}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> SupabaseStore {
        SupabaseStore::new(
            Client::new(),
            SupabaseConfig {
                url: server.uri(),
                key: "service-key".into(),
                table: DEFAULT_TABLE.into(),
            },
        )
        .unwrap()
    }

    fn stored(url: &str) -> StoredCase {
        StoredCase {
            url: url.to_string(),
            title: "Case".into(),
            profit: "$1k".into(),
            profit_num: None,
            category: "SaaS".into(),
            tags: vec!["ai".into()],
            difficulty_score: 3,
            scheme: "Steps".into(),
            stack: "Rust".into(),
            source: "GitHub".into(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 14, 8, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_contains_url_queries_by_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/ai_money_cases"))
            .and(query_param("url", "eq.https://example.com/a"))
            .and(query_param("select", "url"))
            .and(header("apikey", "service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"url": "https://example.com/a"}])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/ai_money_cases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let store = store(&server);
        assert!(store.contains_url("https://example.com/a", None).await.unwrap());
        assert!(!store.contains_url("https://example.com/b", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_contains_url_applies_retention() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("created_at", "gte.2026-10-01T00:00:00.000Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let since = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        assert!(!store(&server)
            .contains_url("https://example.com/a", Some(since))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_storage_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = store(&server).contains_url("https://x", None).await.unwrap_err();
        assert!(matches!(err, CaseBotError::Storage(_)));
    }

    #[tokio::test]
    async fn test_upsert_merges_on_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/ai_money_cases"))
            .and(query_param("on_conflict", "url"))
            .and(header("Prefer", "resolution=merge-duplicates"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        store(&server).upsert_case(&stored("https://example.com/a")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body[0]["url"], "https://example.com/a");
        assert_eq!(body[0]["difficulty_score"], 3);
        assert_eq!(body[0]["profit_num"], serde_json::Value::Null);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = SupabaseStore::new(
            Client::new(),
            SupabaseConfig {
                url: "not a url".into(),
                key: "k".into(),
                table: DEFAULT_TABLE.into(),
            },
        );
        assert!(matches!(result, Err(CaseBotError::Config(_))));
    }
}
