// src/error.rs
//! Error taxonomy.
//!
//! `ConfigError` stops a run before any page is fetched. `FetchError` only ever
//! describes one (property, source, date) triple and is kept on the
//! observation for diagnostics. A missing price is not an error at all; see
//! [`crate::collect::types::RateOutcome::Absent`].

use chrono::NaiveDate;
use thiserror::Error;

fn tracked_by(property: &Option<String>) -> String {
    property
        .as_ref()
        .map(|p| format!(" (tracked for `{p}`)"))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `property` is set when the source came from a configured listing.
    #[error("no extractor registered for source `{source_id}`{}", tracked_by(.property))]
    UnknownSource {
        property: Option<String>,
        source_id: String,
    },

    #[error("{which} base rate must be a finite, non-negative number (got {value})")]
    InvalidBaseRate { which: &'static str, value: f64 },

    #[error("event `{name}` ends ({end}) before it starts ({start})")]
    InvalidEventRange {
        name: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("event `{name}` has an unusable multiplier {multiplier}")]
    InvalidMultiplier { name: String, multiplier: f64 },

    #[error("pricing window must span at least one day")]
    EmptyWindow,

    #[error("url for `{property}` on `{source_id}` has no date placeholder: {url}")]
    MissingDatePlaceholder {
        property: String,
        source_id: String,
        url: String,
    },
}

/// Transport-level failure for a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. } | FetchError::Status { url, .. } => url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_source_names_property_when_known() {
        let listed = ConfigError::UnknownSource {
            property: Some("Hotel Boss".into()),
            source_id: "traveloka".into(),
        };
        assert_eq!(
            listed.to_string(),
            "no extractor registered for source `traveloka` (tracked for `Hotel Boss`)"
        );
        let bare = ConfigError::UnknownSource {
            property: None,
            source_id: "traveloka".into(),
        };
        assert_eq!(
            bare.to_string(),
            "no extractor registered for source `traveloka`"
        );
    }
}
