// src/ingest/error.rs
use thiserror::Error;

/// Network or HTTP-level failure while fetching a search page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("building http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("reading body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The fetched document could not be turned into something queryable.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("document is empty")]
    EmptyDocument,

    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid site origin `{origin}`: {reason}")]
    Origin { origin: String, reason: String },
}

#[derive(Debug, Error)]
#[error("source `{name}` is not registered")]
pub struct NotFoundError {
    pub name: String,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("writing partition {partition}: {source}")]
    Io {
        partition: String,
        #[source]
        source: std::io::Error,
    },

    #[error("encoding record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("sink rejected record: {0}")]
    Rejected(String),
}

/// Everything that can go wrong for a single (keyword, source) pair.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

impl HarvestError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            HarvestError::Fetch(_) => "fetch",
            HarvestError::Parse(_) => "parse",
            HarvestError::Storage(_) => "storage",
            HarvestError::NotFound(_) => "not_found",
        }
    }
}
