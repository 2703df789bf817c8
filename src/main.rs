//! Product harvester — binary entrypoint.
//! Loads config, runs one keyword × source pass and exits.

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use product_harvester::ingest::providers::default_registry;
use product_harvester::ingest::sink::{JsonlSink, LogObserver, StdoutObserver};
use product_harvester::{load_config_default, write_metrics_textfile, Observer, Pipeline};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON lines when HARVEST_LOG_JSON=1.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("product_harvester=info,harvest=info,warn"));

    let json = std::env::var("HARVEST_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = load_config_default().context("loading harvest config")?;
    tracing::info!(
        keywords = cfg.keywords.len(),
        sources = ?cfg.sources,
        max_results = cfg.max_results,
        "config loaded"
    );

    let metrics = match &cfg.metrics_textfile {
        Some(_) => Some(
            PrometheusBuilder::new()
                .install_recorder()
                .context("prometheus: install recorder")?,
        ),
        None => None,
    };

    let registry = default_registry(&cfg)?;
    let pipeline = Pipeline::from_registry(&registry, &cfg.sources)?.with_max_results(cfg.max_results);

    let sink = JsonlSink::new(&cfg.output_dir);
    let observer: Box<dyn Observer> = if cfg.print_records {
        Box::new(StdoutObserver)
    } else {
        Box::new(LogObserver)
    };

    pipeline.run(&cfg.keywords, &sink, observer.as_ref()).await;

    if let (Some(handle), Some(path)) = (&metrics, &cfg.metrics_textfile) {
        write_metrics_textfile(handle, path)?;
    }
    Ok(())
}
