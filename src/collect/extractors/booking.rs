// src/collect/extractors/booking.rs
use crate::collect::extractors::RateExtractor;
use crate::collect::html::find_text_by_class;
use crate::collect::types::SourceId;

pub const SOURCE: &str = "bookingcom";
// Generated class names; these drift whenever the site ships a new build.
const PRICE_CLASSES: &str = "fcab3ed991 bd73d13072";

/// Booking.com hotel page.
pub struct BookingExtractor;

impl RateExtractor for BookingExtractor {
    fn source(&self) -> SourceId {
        SourceId::new(SOURCE)
    }

    fn locate_price(&self, doc: &str) -> Option<String> {
        find_text_by_class(doc, "span", PRICE_CLASSES)
    }

    fn currency_tokens(&self) -> &'static [&'static str] {
        &["S$", "SGD"]
    }
}
