//! Source fan-out/fan-in

use futures::future::join_all;
use tracing::{info, instrument};

use casebot_core::Candidate;
use casebot_sources::{FetchContext, SourceAdapter};

/// Runs every adapter concurrently and concatenates their output
pub struct Aggregator {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl Aggregator {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// Candidates from all adapters, grouped in adapter order with each
    /// adapter's own order kept.
    #[instrument(skip(self, ctx), fields(adapters = self.adapters.len()))]
    pub async fn collect(&self, ctx: &FetchContext) -> Vec<Candidate> {
        let results = join_all(self.adapters.iter().map(|adapter| adapter.fetch(ctx))).await;

        let mut candidates = Vec::new();
        for (adapter, batch) in self.adapters.iter().zip(results) {
            info!(source = adapter.name(), count = batch.len(), "Source fetched");
            candidates.extend(batch);
        }

        info!(total = candidates.len(), "Candidates aggregated");
        candidates
    }
}
