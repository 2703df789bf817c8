// src/ingest/http.rs
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::ingest::error::{FetchError, ParseError};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Thin wrapper over a reqwest client that sends a browser-like User-Agent.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// GET `url` and return the body; non-2xx answers are errors.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Transport {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            source: e,
        })
    }
}

/// Percent-encode a search keyword for use as a query value.
pub fn escape_query(keyword: &str) -> String {
    url::form_urlencoded::byte_serialize(keyword.as_bytes()).collect()
}

/// Parse a site origin (e.g. "https://www.amazon.com") into the base hrefs
/// are resolved against.
pub fn parse_origin(origin: &str) -> Result<Url, ParseError> {
    Url::parse(origin).map_err(|e| ParseError::Origin {
        origin: origin.to_string(),
        reason: e.to_string(),
    })
}

/// Resolve `href` against `base`. `None` when the result isn't a valid URL.
pub fn absolutize(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(String::from)
}
