// src/collect/extractors/agoda.rs
use crate::collect::extractors::RateExtractor;
use crate::collect::html::find_text_by_class;
use crate::collect::types::SourceId;

pub const SOURCE: &str = "agoda";
const PRICE_CLASS: &str = "PropertyPriceBreakdown__PriceValue";

/// Agoda property page: the price sits in a breakdown `<span>`.
pub struct AgodaExtractor;

impl RateExtractor for AgodaExtractor {
    fn source(&self) -> SourceId {
        SourceId::new(SOURCE)
    }

    fn locate_price(&self, doc: &str) -> Option<String> {
        find_text_by_class(doc, "span", PRICE_CLASS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div class="PropertyPriceBreakdown">
          <span class="PropertyPriceBreakdown__Label">Price per night</span>
          <span class="PropertyPriceBreakdown__PriceValue">S$1,215.40</span>
        </div></body></html>"#;

    #[test]
    fn reads_breakdown_price() {
        assert_eq!(AgodaExtractor.extract(PAGE.as_bytes()), Some(1215.4));
    }

    #[test]
    fn currency_in_child_span_is_still_read() {
        let page = r#"<div class="PropertyPriceBreakdown">
            <span class="PropertyPriceBreakdown__PriceValue"><span>S$</span>1,215</span>
            <span class="PropertyPriceBreakdown__Label">per night</span></div>"#;
        assert_eq!(AgodaExtractor.extract(page.as_bytes()), Some(1215.0));
    }

    #[test]
    fn missing_field_or_bad_text_is_absent() {
        assert_eq!(AgodaExtractor.extract(b"<html><p>No rooms</p></html>"), None);
        let sold_out = r#"<span class="PropertyPriceBreakdown__PriceValue">Sold out</span>"#;
        assert_eq!(AgodaExtractor.extract(sold_out.as_bytes()), None);
    }
}
