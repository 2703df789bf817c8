// tests/ingest_pipeline.rs
use async_trait::async_trait;
use product_harvester::ingest::sink::MemorySink;
use product_harvester::{
    AdapterRegistry, FetchError, HarvestError, Observer, ParseError, Pipeline, Record, Sink,
    SourceAdapter, StorageError,
};
use std::sync::{Arc, Mutex};

/// Adapter with scripted behaviour per keyword. The fetched "document" is the
/// keyword itself; extraction yields three records per document.
struct ScriptedAdapter {
    name: &'static str,
    fail_fetch_on: Option<&'static str>,
    fail_parse_on: Option<&'static str>,
}

impl ScriptedAdapter {
    fn ok(name: &'static str) -> Self {
        Self {
            name,
            fail_fetch_on: None,
            fail_parse_on: None,
        }
    }
}

#[async_trait]
impl SourceAdapter for ScriptedAdapter {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch(&self, keyword: &str) -> Result<String, FetchError> {
        if self.fail_fetch_on == Some(keyword) {
            return Err(FetchError::Status {
                url: format!("https://{}.test/s?k={keyword}", self.name),
                status: 503,
            });
        }
        if self.fail_parse_on == Some(keyword) {
            return Ok(String::new());
        }
        Ok(keyword.to_string())
    }

    fn extract(&self, document: &str, max_results: usize) -> Result<Vec<Record>, ParseError> {
        if document.is_empty() {
            return Err(ParseError::EmptyDocument);
        }
        Ok((1..=3)
            .take(max_results)
            .filter_map(|i| {
                Record::new(
                    &format!("{}-{document}-{i}", self.name),
                    "$1",
                    &format!("https://{}.test/p/{i}", self.name),
                )
            })
            .collect())
    }
}

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl Observer for RecordingObserver {
    fn on_record(&self, source: &str, keyword: &str, record: &Record) {
        self.events
            .lock()
            .unwrap()
            .push(format!("{keyword}/{source}/{}", record.title()));
    }

    fn on_failure(&self, source: &str, keyword: &str, error: &HarvestError) {
        self.events
            .lock()
            .unwrap()
            .push(format!("{keyword}/{source}/!{}", error.kind()));
    }
}

/// Rejects every record whose title ends with "-2".
struct PickySink(MemorySink);

#[async_trait]
impl Sink for PickySink {
    async fn save(&self, partition: &str, record: &Record) -> Result<(), StorageError> {
        if record.title().ends_with("-2") {
            return Err(StorageError::Rejected("quota".into()));
        }
        self.0.save(partition, record).await
    }
}

fn titles(sink: &MemorySink) -> Vec<String> {
    sink.records()
        .into_iter()
        .map(|(p, r)| format!("{p}:{}", r.title()))
        .collect()
}

#[tokio::test]
async fn keyword_outer_source_inner_order() {
    let pipeline = Pipeline::new(vec![
        Arc::new(ScriptedAdapter::ok("a")),
        Arc::new(ScriptedAdapter::ok("b")),
    ])
    .with_max_results(1);
    let sink = MemorySink::new();
    let obs = RecordingObserver::default();

    let summary = pipeline.run(&["k1", "k2"], &sink, &obs).await;

    assert_eq!(summary.pairs, 4);
    assert_eq!(summary.saved, 4);
    assert_eq!(
        titles(&sink),
        vec![
            "a_products:a-k1-1",
            "b_products:b-k1-1",
            "a_products:a-k2-1",
            "b_products:b-k2-1",
        ]
    );
}

#[tokio::test]
async fn fetch_failure_is_isolated_to_its_pair() {
    let failing = ScriptedAdapter {
        name: "a",
        fail_fetch_on: Some("k1"),
        fail_parse_on: None,
    };
    let pipeline = Pipeline::new(vec![Arc::new(failing), Arc::new(ScriptedAdapter::ok("b"))])
        .with_max_results(1);
    let sink = MemorySink::new();
    let obs = RecordingObserver::default();

    let summary = pipeline.run(&["k1", "k2"], &sink, &obs).await;

    // b still runs for k1, a runs again for k2.
    assert_eq!(
        titles(&sink),
        vec!["b_products:b-k1-1", "a_products:a-k2-1", "b_products:b-k2-1"]
    );
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].keyword, "k1");
    assert_eq!(summary.failures[0].source, "a");
    assert!(summary.failures[0].message.contains("503"));
    assert_eq!(obs.events.lock().unwrap()[0], "k1/a/!fetch");
}

#[tokio::test]
async fn parse_failure_is_isolated_to_its_pair() {
    let broken = ScriptedAdapter {
        name: "a",
        fail_fetch_on: None,
        fail_parse_on: Some("k2"),
    };
    let pipeline = Pipeline::new(vec![Arc::new(broken)]);
    let sink = MemorySink::new();
    let obs = RecordingObserver::default();

    let summary = pipeline.run(&["k1", "k2", "k3"], &sink, &obs).await;

    assert_eq!(summary.parse_failures, 1);
    assert_eq!(summary.saved, 6);
    assert!(titles(&sink).iter().all(|t| !t.contains("-k2-")));
}

#[tokio::test]
async fn storage_errors_skip_only_the_record() {
    let pipeline = Pipeline::new(vec![Arc::new(ScriptedAdapter::ok("a"))]);
    let sink = PickySink(MemorySink::new());
    let obs = RecordingObserver::default();

    let summary = pipeline.run(&["k"], &sink, &obs).await;

    assert_eq!(summary.saved, 2);
    assert_eq!(summary.storage_failures, 1);
    assert_eq!(
        titles(&sink.0),
        vec!["a_products:a-k-1", "a_products:a-k-3"]
    );
    // The observer saw every record, stored or not.
    let ev = obs.events.lock().unwrap();
    assert_eq!(
        *ev,
        vec!["k/a/a-k-1", "k/a/a-k-2", "k/a/!storage", "k/a/a-k-3"]
    );
}

#[tokio::test]
async fn result_cap_applies_per_pair() {
    let pipeline = Pipeline::new(vec![Arc::new(ScriptedAdapter::ok("a"))]).with_max_results(2);
    let sink = MemorySink::new();
    let summary = pipeline
        .run(&["k"], &sink, &RecordingObserver::default())
        .await;
    assert_eq!(summary.saved, 2);
}

#[test]
fn unknown_source_fails_before_running() {
    let mut reg = AdapterRegistry::new();
    reg.register(Arc::new(ScriptedAdapter::ok("amazon")));
    let err = Pipeline::from_registry(&reg, &["amazon", "gmarket"]).err().unwrap();
    assert_eq!(err.name, "gmarket");

    let p = Pipeline::from_registry(&reg, &["amazon"]).unwrap();
    assert_eq!(p.source_names(), vec!["amazon"]);
}

/// Serves records straight from `search`; `fetch` always fails.
struct CachedAdapter;

#[async_trait]
impl SourceAdapter for CachedAdapter {
    fn name(&self) -> &str {
        "cached"
    }

    async fn fetch(&self, keyword: &str) -> Result<String, FetchError> {
        Err(FetchError::Timeout {
            url: format!("https://cached.test/s?k={keyword}"),
        })
    }

    fn extract(&self, _document: &str, _max_results: usize) -> Result<Vec<Record>, ParseError> {
        Ok(vec![])
    }

    async fn search(
        &self,
        keyword: &str,
        max_results: Option<usize>,
    ) -> Result<Vec<Record>, HarvestError> {
        Ok((1..=5)
            .take(max_results.unwrap_or(5))
            .filter_map(|i| Record::new(&format!("{keyword}-{i}"), "$1", "https://cached.test/p"))
            .collect())
    }
}

#[tokio::test]
async fn pipeline_goes_through_adapter_search() {
    let pipeline = Pipeline::new(vec![Arc::new(CachedAdapter)]).with_max_results(2);
    let sink = MemorySink::new();
    let summary = pipeline
        .run(&["k"], &sink, &RecordingObserver::default())
        .await;

    assert_eq!(summary.fetch_failures, 0);
    assert_eq!(
        titles(&sink),
        vec!["cached_products:k-1", "cached_products:k-2"]
    );
}
