// src/collect/types.rs
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Identity of a rate provider, e.g. "agoda" or "bookingcom".
/// Stored trimmed and lowercased so config spelling does not matter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SourceId(String);

impl SourceId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SourceId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One place a property is listed: the source plus its per-date URL template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub source: SourceId,
    /// Query template, e.g. `https://host/hotel?checkin={date}`.
    pub url: String,
}

/// A competitor hotel being tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub listings: Vec<Listing>,
}

/// What one collection attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RateOutcome {
    /// Price found and parsed.
    Rate(f64),
    /// Page fetched, but no price could be read from it.
    Absent,
    /// The fetch itself failed; the cause is kept for diagnostics.
    Unresolved(FetchError),
}

/// One (property, source, date) sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub property: String,
    pub source: SourceId,
    pub date: NaiveDate,
    pub outcome: RateOutcome,
}

impl Observation {
    /// Usable rate, if any. Absent and unresolved both read as `None`.
    pub fn rate(&self) -> Option<f64> {
        match self.outcome {
            RateOutcome::Rate(r) => Some(r),
            RateOutcome::Absent | RateOutcome::Unresolved(_) => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self.outcome, RateOutcome::Unresolved(_))
    }
}

pub type Headers = BTreeMap<String, String>;

/// Raw document retrieval. Transport concerns (TLS, timeouts) live behind it.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, headers: &Headers) -> Result<Vec<u8>, FetchError>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_id_is_case_and_space_insensitive() {
        assert_eq!(SourceId::new(" Agoda "), SourceId::new("agoda"));
        let parsed: Listing =
            serde_json::from_str(r#"{"source":"BookingCom","url":"x?d={date}"}"#).unwrap();
        assert_eq!(parsed.source.as_str(), "bookingcom");
    }

    #[test]
    fn absent_and_unresolved_carry_no_rate() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mk = |outcome| Observation {
            property: "A".into(),
            source: "agoda".into(),
            date: d,
            outcome,
        };
        assert_eq!(mk(RateOutcome::Rate(120.0)).rate(), Some(120.0));
        assert_eq!(mk(RateOutcome::Absent).rate(), None);
        let failed = mk(RateOutcome::Unresolved(FetchError::Status {
            url: "u".into(),
            status: 503,
        }));
        assert_eq!(failed.rate(), None);
        assert!(failed.is_unresolved());
    }
}
