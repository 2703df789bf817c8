// src/ingest/providers/mod.rs
pub mod amazon;
pub mod coupang;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use metrics::{counter, histogram};
use scraper::{ElementRef, Html, Selector};

use crate::config::harvest::HarvestConfig;
use crate::ingest::affiliate::AffiliateTagger;
use crate::ingest::error::ParseError;
use crate::ingest::http::HttpFetcher;
use crate::ingest::registry::AdapterRegistry;
use crate::ingest::types::Record;

use self::amazon::AmazonAdapter;
use self::coupang::CoupangAdapter;

/// Compiled CSS selectors describing one site's results page.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    item: Selector,
    title: Selector,
    price: Selector,
    link: Selector,
}

impl ListingSelectors {
    pub fn compile(item: &str, title: &str, price: &str, link: &str) -> Result<Self, ParseError> {
        Ok(Self {
            item: compile_selector(item)?,
            title: compile_selector(title)?,
            price: compile_selector(price)?,
            link: compile_selector(link)?,
        })
    }
}

fn compile_selector(s: &str) -> Result<Selector, ParseError> {
    Selector::parse(s).map_err(|e| ParseError::Selector {
        selector: s.to_string(),
        reason: e.to_string(),
    })
}

fn first_text(item: &ElementRef<'_>, sel: &Selector) -> Option<String> {
    item.select(sel).next().map(|el| el.text().collect())
}

/// Walk the first `max_results` item containers of `document` and build a
/// record for each one that has a title, a price and a link.
///
/// Containers are cut to `max_results` before incomplete ones are dropped, so
/// a page with gaps can yield fewer records than requested. `finish_link` gets
/// the raw `href` and returns the link to store, or `None` to drop the item.
pub fn extract_listing<F>(
    source: &str,
    document: &str,
    selectors: &ListingSelectors,
    max_results: usize,
    finish_link: F,
) -> Result<Vec<Record>, ParseError>
where
    F: Fn(&str) -> Option<String>,
{
    if document.trim().is_empty() {
        return Err(ParseError::EmptyDocument);
    }
    let t0 = std::time::Instant::now();
    let html = Html::parse_document(document);

    let mut out = Vec::new();
    for item in html.select(&selectors.item).take(max_results) {
        let Some(title) = first_text(&item, &selectors.title) else {
            continue;
        };
        let Some(price) = first_text(&item, &selectors.price) else {
            continue;
        };
        let Some(href) = item
            .select(&selectors.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|h| !h.is_empty())
        else {
            continue;
        };

        let Some(link) = finish_link(href) else {
            continue;
        };

        if let Some(rec) = Record::new(&title, &price, &link) {
            out.push(rec);
        }
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("harvest_extract_ms", "source" => source.to_string()).record(ms);
    counter!("harvest_records_total", "source" => source.to_string()).increment(out.len() as u64);
    Ok(out)
}

/// Registry with every built-in source, wired from `cfg`.
pub fn default_registry(cfg: &HarvestConfig) -> Result<AdapterRegistry> {
    let http = HttpFetcher::new(&cfg.user_agent, Duration::from_secs(cfg.timeout_secs))
        .context("building http client")?;
    let tagger = AffiliateTagger::new(cfg.affiliate_tag.clone());

    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(
        AmazonAdapter::new(http.clone(), tagger).context("amazon adapter")?,
    ));
    registry.register(Arc::new(
        CoupangAdapter::new(http).context("coupang adapter")?,
    ));
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <ul>
          <li class="it"><b class="t"> One </b><i class="p">1</i><a class="l" href="/1">x</a></li>
          <li class="it"><b class="t">Two</b><a class="l" href="/2">x</a></li>
          <li class="it"><b class="t">Three</b><i class="p">3</i><a class="l">no href</a></li>
          <li class="it"><b class="t">Four</b><i class="p">4</i><a class="l" href="/4">x</a></li>
        </ul>"#;

    fn sels() -> ListingSelectors {
        ListingSelectors::compile("li.it", ".t", ".p", "a.l").unwrap()
    }

    #[test]
    fn skips_incomplete_items_without_shifting() {
        let out = extract_listing("test", PAGE, &sels(), 10, |h| Some(format!("https://s{h}"))).unwrap();
        let titles: Vec<_> = out.iter().map(Record::title).collect();
        assert_eq!(titles, vec!["One", "Four"]);
        assert_eq!(out[1].link(), "https://s/4");
        assert_eq!(out[1].price(), "4");
    }

    #[test]
    fn truncates_containers_before_filtering() {
        // First three containers hold only one complete item.
        let out = extract_listing("test", PAGE, &sels(), 3, |h| Some(h.to_string())).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title(), "One");
    }

    #[test]
    fn unresolvable_link_drops_only_that_item() {
        let out = extract_listing("test", PAGE, &sels(), 10, |h| {
            (h != "/1").then(|| h.to_string())
        })
        .unwrap();
        let titles: Vec<_> = out.iter().map(Record::title).collect();
        assert_eq!(titles, vec!["Four"]);
    }

    #[test]
    fn zero_cap_yields_nothing() {
        let out = extract_listing("test", PAGE, &sels(), 0, |h| Some(h.to_string())).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn blank_document_is_a_parse_error() {
        let err = extract_listing("test", "  \n ", &sels(), 10, |h| Some(h.to_string())).unwrap_err();
        assert!(matches!(err, ParseError::EmptyDocument));
    }

    #[test]
    fn bad_selector_is_reported() {
        let err = ListingSelectors::compile("li[", ".t", ".p", "a").unwrap_err();
        match err {
            ParseError::Selector { selector, .. } => assert_eq!(selector, "li["),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn default_registry_lists_builtin_sources_in_order() {
        let reg = default_registry(&HarvestConfig::default()).unwrap();
        assert_eq!(reg.names(), vec!["amazon", "coupang"]);
    }
}
