// src/ingest/providers/coupang.rs
use async_trait::async_trait;
use url::Url;

use crate::ingest::error::{FetchError, ParseError};
use crate::ingest::http::{absolutize, escape_query, parse_origin, HttpFetcher};
use crate::ingest::providers::{extract_listing, ListingSelectors};
use crate::ingest::types::{Record, SourceAdapter};

pub const NAME: &str = "coupang";
pub const ORIGIN: &str = "https://www.coupang.com";

const ITEM: &str = "ul.search-product-list li.search-product";
const TITLE: &str = ".name";
const PRICE: &str = ".price-value";
const LINK: &str = "a.search-product-link";

/// Coupang search results. No affiliate program, links are stored as-is.
pub struct CoupangAdapter {
    http: HttpFetcher,
    origin: String,
    base: Url,
    selectors: ListingSelectors,
}

impl CoupangAdapter {
    pub fn new(http: HttpFetcher) -> Result<Self, ParseError> {
        Ok(Self {
            http,
            origin: ORIGIN.to_string(),
            base: parse_origin(ORIGIN)?,
            selectors: ListingSelectors::compile(ITEM, TITLE, PRICE, LINK)?,
        })
    }

    pub fn with_origin(mut self, origin: &str) -> Result<Self, ParseError> {
        self.base = parse_origin(origin)?;
        self.origin = origin.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn search_url(&self, keyword: &str) -> String {
        format!("{}/np/search?q={}", self.origin, escape_query(keyword))
    }
}

#[async_trait]
impl SourceAdapter for CoupangAdapter {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, keyword: &str) -> Result<String, FetchError> {
        self.http.get_text(&self.search_url(keyword)).await
    }

    fn extract(&self, document: &str, max_results: usize) -> Result<Vec<Record>, ParseError> {
        extract_listing(NAME, document, &self.selectors, max_results, |href| {
            absolutize(&self.base, href)
        })
    }
}
