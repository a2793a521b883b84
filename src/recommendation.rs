//! recommendation.rs — output of the pricing engine, one per date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which pricing step set the final rate. When an event fires it is reported
/// even if the competitor floor also moved the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonKind {
    BaseOnly,
    CompetitorAdjusted,
    EventAdjusted,
}

impl ReasonKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonKind::BaseOnly => "BASE_ONLY",
            ReasonKind::CompetitorAdjusted => "COMPETITOR_ADJUSTED",
            ReasonKind::EventAdjusted => "EVENT_ADJUSTED",
        }
    }
}

impl std::fmt::Display for ReasonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category plus a display sentence. Only `kind` is meant for logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub kind: ReasonKind,
    pub message: String,
}

impl Reason {
    pub fn new(kind: ReasonKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecommendation {
    pub date: NaiveDate,
    pub base_rate: f64,
    /// Full precision; round only when displaying.
    pub suggested_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    pub reason: Reason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

impl PriceRecommendation {
    pub fn kind(&self) -> ReasonKind {
        self.reason.kind
    }

    /// Suggested rate rounded to cents.
    pub fn display_rate(&self) -> f64 {
        round2(self.suggested_rate)
    }
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_shape() {
        let r = PriceRecommendation {
            date: NaiveDate::from_ymd_opt(2025, 3, 19).unwrap(),
            base_rate: 150.0,
            suggested_rate: 165.00000000000003,
            competitor_rate: None,
            event: Some("Jason Derulo Concert".into()),
            reason: Reason::new(ReasonKind::EventAdjusted, "Jason Derulo Concert x1.10"),
            promotion: None,
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["date"], serde_json::json!("2025-03-19"));
        assert_eq!(v["reason"]["kind"], serde_json::json!("EVENT_ADJUSTED"));
        assert!(v.get("competitor_rate").is_none());
        assert!(v.get("promotion").is_none());
        assert_eq!(r.display_rate(), 165.0);
    }

    #[test]
    fn kind_strings_match_serde() {
        for k in [
            ReasonKind::BaseOnly,
            ReasonKind::CompetitorAdjusted,
            ReasonKind::EventAdjusted,
        ] {
            assert_eq!(serde_json::to_value(k).unwrap(), serde_json::json!(k.as_str()));
        }
    }
}
