// src/collect/extractors/expedia.rs
use crate::collect::extractors::RateExtractor;
use crate::collect::html::find_text_by_class;
use crate::collect::types::SourceId;

pub const SOURCE: &str = "expedia";
const PRICE_CLASS: &str = "price-summary-price-value";

pub struct ExpediaExtractor;

impl RateExtractor for ExpediaExtractor {
    fn source(&self) -> SourceId {
        SourceId::new(SOURCE)
    }

    fn locate_price(&self, doc: &str) -> Option<String> {
        find_text_by_class(doc, "span", PRICE_CLASS)
    }
}
