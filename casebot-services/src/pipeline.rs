//! One end-to-end run: aggregate, extract, deliver, persist

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use casebot_research::{CaseExtractor, Extraction};
use casebot_sources::FetchContext;

use crate::aggregator::Aggregator;
use crate::digest::render_digest;
use crate::persistence::PersistenceSink;
use crate::telegram::DigestSender;

/// How a run ended. Every variant is a normal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Sources produced nothing new
    NoCandidates,
    /// No model credential produced a usable answer
    ExtractionUnavailable,
    /// The model answered with zero usable cases
    NothingExtracted,
    Completed {
        delivered: bool,
        persisted: usize,
        notes: usize,
    },
}

pub struct Pipeline {
    aggregator: Aggregator,
    context: FetchContext,
    extractor: CaseExtractor,
    sender: Option<Arc<dyn DigestSender>>,
    sink: PersistenceSink,
}

impl Pipeline {
    pub fn new(
        aggregator: Aggregator,
        context: FetchContext,
        extractor: CaseExtractor,
        sender: Option<Arc<dyn DigestSender>>,
        sink: PersistenceSink,
    ) -> Self {
        Self {
            aggregator,
            context,
            extractor,
            sender,
            sink,
        }
    }

    #[instrument(skip(self))]
    pub async fn run(&self) -> RunOutcome {
        let started = Utc::now();
        info!(at = %started, "Run started");

        let ctx = self.context.clone().with_now(started);
        let candidates = self.aggregator.collect(&ctx).await;
        if candidates.is_empty() {
            info!("No new candidates");
            return RunOutcome::NoCandidates;
        }

        let cases = match self.extractor.extract(&candidates).await {
            Extraction::Unavailable => {
                warn!("Extraction unavailable, skipping delivery and persistence");
                return RunOutcome::ExtractionUnavailable;
            }
            Extraction::Cases(cases) if cases.is_empty() => {
                info!("Model found no cases");
                return RunOutcome::NothingExtracted;
            }
            Extraction::Cases(cases) => cases,
        };
        info!(cases = cases.len(), "Cases extracted");

        let digest = render_digest(&cases);
        let delivered = match &self.sender {
            Some(sender) => match sender.send(&digest).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Digest delivery failed");
                    false
                }
            },
            None => {
                warn!("No messaging channel configured, digest not sent");
                false
            }
        };

        let report = self.sink.persist(&cases, Utc::now()).await;

        RunOutcome::Completed {
            delivered,
            persisted: report.upserted,
            notes: report.notes_written,
        }
    }
}
