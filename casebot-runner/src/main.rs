//! AI money case bot
//!
//! Single-shot run meant to be triggered by an external scheduler: poll
//! the sources, extract cases with Gemini, post the digest to Telegram and
//! persist the cases.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use casebot_core::CaseStore;
use casebot_research::{CaseExtractor, GeminiClient};
use casebot_services::{
    Aggregator, DigestSender, NoteWriter, PersistenceSink, Pipeline, RunOutcome, SupabaseStore,
    TelegramSender,
};
use casebot_sources::{default_adapters, DuplicateFilter, FetchContext};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,casebot=debug")),
        )
        .init();

    info!("Starting AI money case bot");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.log_summary();

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let store = build_store(&http, &config);

    let filter = match &store {
        Some(store) => {
            let filter = DuplicateFilter::new(Arc::clone(store));
            match config.seen_url_retention {
                Some(retention) => filter.with_retention(retention),
                None => filter,
            }
        }
        None => DuplicateFilter::disabled(),
    };

    let sender: Option<Arc<dyn DigestSender>> = match &config.telegram {
        Some(telegram) => Some(Arc::new(
            TelegramSender::new(
                http.clone(),
                telegram.bot_token.clone(),
                telegram.chat_id.clone(),
            )
            .with_timeout(config.http_timeout),
        )),
        None => {
            warn!("Telegram not configured - digest will not be delivered");
            None
        }
    };

    let model = GeminiClient::new(http.clone()).with_model(&config.gemini_model);
    let extractor = CaseExtractor::new(Arc::new(model), config.gemini_api_keys.clone())
        .with_max_candidates(config.max_candidates)
        .with_quota_delay(config.quota_retry_delay);

    let notes = config.notes_dir.clone().map(NoteWriter::new);
    let sink = PersistenceSink::new(store, notes);

    let context = FetchContext::new(http, filter).with_timeout(config.http_timeout);
    let pipeline = Pipeline::new(
        Aggregator::new(default_adapters()),
        context,
        extractor,
        sender,
        sink,
    );

    match pipeline.run().await {
        RunOutcome::NoCandidates => info!("Run finished: no new candidates today"),
        RunOutcome::ExtractionUnavailable => {
            warn!("Run finished: extraction unavailable for all credentials")
        }
        RunOutcome::NothingExtracted => info!("Run finished: no cases found in candidates"),
        RunOutcome::Completed {
            delivered,
            persisted,
            notes,
        } => info!(delivered, persisted, notes, "Run finished"),
    }

    Ok(())
}

/// The case table, or `None` when Supabase is absent or unusable. Without
/// a store, deduplication is off and persistence only writes notes.
fn build_store(http: &reqwest::Client, config: &Config) -> Option<Arc<dyn CaseStore>> {
    let Some(supabase) = &config.supabase else {
        warn!("Supabase not configured - deduplication and persistence disabled");
        return None;
    };

    match SupabaseStore::new(http.clone(), supabase.clone()) {
        Ok(store) => Some(Arc::new(store.with_timeout(config.http_timeout))),
        Err(e) => {
            warn!(error = %e, "Supabase unusable - deduplication and persistence disabled");
            None
        }
    }
}
