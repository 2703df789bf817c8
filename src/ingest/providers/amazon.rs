// src/ingest/providers/amazon.rs
use async_trait::async_trait;
use url::Url;

use crate::ingest::affiliate::AffiliateTagger;
use crate::ingest::error::{FetchError, ParseError};
use crate::ingest::http::{absolutize, escape_query, parse_origin, HttpFetcher};
use crate::ingest::providers::{extract_listing, ListingSelectors};
use crate::ingest::types::{Record, SourceAdapter};

pub const NAME: &str = "amazon";
pub const ORIGIN: &str = "https://www.amazon.com";

const ITEM: &str = ".s-result-item[data-asin]";
const TITLE: &str = "h2 span";
const PRICE: &str = ".a-price .a-offscreen";
const LINK: &str = "h2 a";

/// Amazon search results. Product links get the partner tag.
pub struct AmazonAdapter {
    http: HttpFetcher,
    tagger: AffiliateTagger,
    origin: String,
    base: Url,
    selectors: ListingSelectors,
}

impl AmazonAdapter {
    pub fn new(http: HttpFetcher, tagger: AffiliateTagger) -> Result<Self, ParseError> {
        Ok(Self {
            http,
            tagger,
            origin: ORIGIN.to_string(),
            base: parse_origin(ORIGIN)?,
            selectors: ListingSelectors::compile(ITEM, TITLE, PRICE, LINK)?,
        })
    }

    /// Point the adapter at another host (mirrors, local test servers).
    pub fn with_origin(mut self, origin: &str) -> Result<Self, ParseError> {
        self.base = parse_origin(origin)?;
        self.origin = origin.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn search_url(&self, keyword: &str) -> String {
        format!("{}/s?k={}", self.origin, escape_query(keyword))
    }
}

#[async_trait]
impl SourceAdapter for AmazonAdapter {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, keyword: &str) -> Result<String, FetchError> {
        self.http.get_text(&self.search_url(keyword)).await
    }

    fn extract(&self, document: &str, max_results: usize) -> Result<Vec<Record>, ParseError> {
        extract_listing(NAME, document, &self.selectors, max_results, |href| {
            absolutize(&self.base, href).map(|link| self.tagger.normalize(&link))
        })
    }
}
