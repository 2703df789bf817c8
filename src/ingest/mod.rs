// src/ingest/mod.rs
pub mod affiliate;
pub mod error;
pub mod http;
pub mod providers;
pub mod registry;
pub mod sink;
pub mod types;

use std::sync::Arc;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::ingest::error::{HarvestError, NotFoundError};
use crate::ingest::registry::AdapterRegistry;
use crate::ingest::types::{Observer, Sink, SourceAdapter, DEFAULT_MAX_RESULTS};

/// One-time metrics registration (so series show up in exports).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "harvest_records_total",
            "Records extracted from result pages."
        );
        describe_counter!(
            "harvest_source_errors_total",
            "Fetch/parse failures per (keyword, source) pair."
        );
        describe_counter!(
            "harvest_storage_errors_total",
            "Records the sink failed to store."
        );
        describe_histogram!("harvest_extract_ms", "Result page extraction time in milliseconds.");
        describe_gauge!("harvest_last_run_ts", "Unix ts when the harvest pipeline last ran.");
    });
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PairFailure {
    pub keyword: String,
    pub source: String,
    pub kind: &'static str,
    pub message: String,
}

/// Counters for one pass over keywords × sources.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub pairs: usize,
    pub saved: usize,
    pub fetch_failures: usize,
    pub parse_failures: usize,
    pub storage_failures: usize,
    pub failures: Vec<PairFailure>,
}

impl RunSummary {
    fn record_failure(&mut self, keyword: &str, source: &str, err: &HarvestError) {
        match err {
            HarvestError::Fetch(_) => self.fetch_failures += 1,
            HarvestError::Parse(_) => self.parse_failures += 1,
            HarvestError::Storage(_) => self.storage_failures += 1,
            HarvestError::NotFound(_) => {}
        }
        self.failures.push(PairFailure {
            keyword: keyword.to_string(),
            source: source.to_string(),
            kind: err.kind(),
            message: err.to_string(),
        });
    }
}

/// Sequential keyword × source harvesting loop.
pub struct Pipeline {
    sources: Vec<Arc<dyn SourceAdapter>>,
    max_results: usize,
}

impl Pipeline {
    pub fn new(sources: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self {
            sources,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Pipeline over `names`, resolved against `registry` in that order.
    /// Unknown names fail here, before anything is fetched.
    pub fn from_registry<S: AsRef<str>>(
        registry: &AdapterRegistry,
        names: &[S],
    ) -> Result<Self, NotFoundError> {
        Ok(Self::new(registry.select(names)?))
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// For each keyword, for each source: fetch, extract, then hand every
    /// record to `observer` and `sink` as soon as it is available.
    ///
    /// A failing pair or record is logged and counted; the loop always runs to
    /// the end.
    pub async fn run<K: AsRef<str>>(
        &self,
        keywords: &[K],
        sink: &dyn Sink,
        observer: &dyn Observer,
    ) -> RunSummary {
        ensure_metrics_described();
        let mut summary = RunSummary::default();

        for kw in keywords {
            let kw = kw.as_ref();
            for src in &self.sources {
                summary.pairs += 1;
                let name = src.name();

                let records = match src.search(kw, Some(self.max_results)).await {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(error = %e, kind = e.kind(), source = name, keyword = kw, "source failed");
                        counter!(
                            "harvest_source_errors_total",
                            "source" => name.to_string(),
                            "kind" => e.kind()
                        )
                        .increment(1);
                        observer.on_failure(name, kw, &e);
                        summary.record_failure(kw, name, &e);
                        continue;
                    }
                };

                tracing::debug!(source = name, keyword = kw, count = records.len(), "extracted");
                let partition = src.partition();
                for rec in records {
                    observer.on_record(name, kw, &rec);
                    match sink.save(&partition, &rec).await {
                        Ok(()) => summary.saved += 1,
                        Err(e) => {
                            let e = HarvestError::from(e);
                            tracing::warn!(error = %e, source = name, keyword = kw, partition = %partition, "store failed");
                            counter!("harvest_storage_errors_total").increment(1);
                            observer.on_failure(name, kw, &e);
                            summary.record_failure(kw, name, &e);
                        }
                    }
                }
            }
        }

        let now = chrono::Utc::now().timestamp().max(0) as u64;
        gauge!("harvest_last_run_ts").set(now as f64);

        tracing::info!(
            target: "harvest",
            pairs = summary.pairs,
            saved = summary.saved,
            fetch_failures = summary.fetch_failures,
            parse_failures = summary.parse_failures,
            storage_failures = summary.storage_failures,
            "harvest run finished"
        );
        summary
    }
}
