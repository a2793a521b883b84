// src/collect/extractors/stb.rs
//! Accommodation search API. The response is JSON, not markup:
//! `{"data": [{"name": ..., "leadInRoomRate": 185.0}, ...]}`.
//! The first record is the property the query was built for.

use serde_json::Value;

use crate::collect::extractors::RateExtractor;
use crate::collect::types::SourceId;

pub const SOURCE: &str = "stb";
const RATE_FIELD: &str = "leadInRoomRate";

pub struct StbExtractor;

impl RateExtractor for StbExtractor {
    fn source(&self) -> SourceId {
        SourceId::new(SOURCE)
    }

    fn locate_price(&self, doc: &str) -> Option<String> {
        let body: Value = serde_json::from_str(doc).ok()?;
        let first = body.get("data")?.as_array()?.first()?;
        match first.get(RATE_FIELD)? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn currency_tokens(&self) -> &'static [&'static str] {
        &["S$", "SGD"]
    }
}
