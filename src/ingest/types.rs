// src/ingest/types.rs
use async_trait::async_trait;
use serde::Serialize;

use crate::ingest::error::{FetchError, HarvestError, ParseError, StorageError};

/// Number of result items taken from a page when the caller doesn't say.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// One product listing as shown on a search results page.
///
/// Only built through [`Record::new`], so all three fields are always present,
/// trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    title: String,
    price: String, // as displayed, e.g. "$12.99" or "12,900"
    link: String,
}

impl Record {
    pub fn new(title: &str, price: &str, link: &str) -> Option<Self> {
        let (title, price, link) = (title.trim(), price.trim(), link.trim());
        if title.is_empty() || price.is_empty() || link.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            price: price.to_string(),
            link: link.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn link(&self) -> &str {
        &self.link
    }
}

/// A site-specific search page scraper.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable source name, e.g. "amazon".
    fn name(&self) -> &str;

    /// GET the search results page for `keyword` and return the raw body.
    async fn fetch(&self, keyword: &str) -> Result<String, FetchError>;

    /// Pull at most `max_results` records out of a results page, in page order.
    fn extract(&self, document: &str, max_results: usize) -> Result<Vec<Record>, ParseError>;

    /// Storage partition records of this source are routed to.
    fn partition(&self) -> String {
        format!("{}_products", self.name())
    }

    async fn search(
        &self,
        keyword: &str,
        max_results: Option<usize>,
    ) -> Result<Vec<Record>, HarvestError> {
        let body = self.fetch(keyword).await?;
        let records = self.extract(&body, max_results.unwrap_or(DEFAULT_MAX_RESULTS))?;
        Ok(records)
    }
}

/// Storage collaborator receiving every harvested record.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn save(&self, partition: &str, record: &Record) -> Result<(), StorageError>;
}

/// Side channel for display/audit. Never used for control flow.
pub trait Observer: Send + Sync {
    fn on_record(&self, source: &str, keyword: &str, record: &Record);

    fn on_failure(&self, _source: &str, _keyword: &str, _error: &HarvestError) {}
}
