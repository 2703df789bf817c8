// src/ingest/affiliate.rs

/// Query key carrying the partner id.
pub const MARKER_KEY: &str = "tag";

/// Appends a partner tag to product links so purchases are attributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffiliateTagger {
    partner_id: String,
}

impl AffiliateTagger {
    pub fn new(partner_id: impl Into<String>) -> Self {
        Self {
            partner_id: partner_id.into(),
        }
    }

    pub fn partner_id(&self) -> &str {
        &self.partner_id
    }

    /// Returns `link` with exactly one `tag=` marker.
    ///
    /// Links that already carry a marker (ours or anyone else's) come back
    /// untouched, so tagging twice is a no-op. The check and the append are
    /// plain string operations; the URL isn't parsed.
    pub fn normalize(&self, link: &str) -> String {
        let marker = format!("{MARKER_KEY}=");
        if link.contains(&marker) {
            return link.to_string();
        }
        let sep = if link.contains('?') { '&' } else { '?' };
        format!("{link}{sep}{marker}{}", self.partner_id)
    }
}
