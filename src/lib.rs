// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod ingest;

// ---- Re-exports for stable public API ----
pub use crate::config::harvest::{load_config_default, HarvestConfig};
pub use crate::ingest::affiliate::AffiliateTagger;
pub use crate::ingest::error::{FetchError, HarvestError, NotFoundError, ParseError, StorageError};
pub use crate::ingest::registry::AdapterRegistry;
pub use crate::ingest::types::{Observer, Record, Sink, SourceAdapter, DEFAULT_MAX_RESULTS};
pub use crate::ingest::{Pipeline, RunSummary};

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusHandle;

/// Write the current Prometheus exposition to `path` (node_exporter textfile
/// collector format).
pub fn write_metrics_textfile(handle: &PrometheusHandle, path: &std::path::Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    std::fs::write(path, handle.render())
        .with_context(|| format!("writing metrics to {}", path.display()))?;
    Ok(())
}
