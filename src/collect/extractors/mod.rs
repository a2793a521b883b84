// src/collect/extractors/mod.rs
//! Per-source rate extractors and the registry that maps a source id to its
//! extractor. Adding a source means adding one module and one `register` call.

pub mod agoda;
pub mod booking;
pub mod expedia;
pub mod stb;

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::collect::html::parse_price_text;
use crate::collect::types::SourceId;
use crate::error::ConfigError;

/// Turns one fetched document from a single known source into a rate.
///
/// `None` means the page carried no readable price. That is an expected
/// outcome (sold out, layout drift) and never an error.
pub trait RateExtractor: Send + Sync {
    fn source(&self) -> SourceId;

    /// Bytes to text. Pages are decoded lossily; a stray byte should not
    /// hide an otherwise readable price.
    fn decode<'a>(&self, document: &'a [u8]) -> Cow<'a, str> {
        String::from_utf8_lossy(document)
    }

    /// Raw text of the single price-bearing field, if present.
    fn locate_price(&self, doc: &str) -> Option<String>;

    /// Currency markers removed before numeric parsing.
    fn currency_tokens(&self) -> &'static [&'static str] {
        &["S$"]
    }

    fn extract(&self, document: &[u8]) -> Option<f64> {
        let doc = self.decode(document);
        let text = self.locate_price(&doc)?;
        parse_price_text(&text, self.currency_tokens())
    }
}

/// Source id → extractor. Looked up once per observation.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    by_source: HashMap<SourceId, Arc<dyn RateExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every extractor shipped in this crate.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        reg.register(agoda::AgodaExtractor);
        reg.register(booking::BookingExtractor);
        reg.register(expedia::ExpediaExtractor);
        reg.register(stb::StbExtractor);
        reg
    }

    /// Later registrations for the same source replace earlier ones.
    pub fn register<E: RateExtractor + 'static>(&mut self, extractor: E) {
        self.by_source.insert(extractor.source(), Arc::new(extractor));
    }

    pub fn get(&self, source: &SourceId) -> Option<Arc<dyn RateExtractor>> {
        self.by_source.get(source).cloned()
    }

    pub fn contains(&self, source: &SourceId) -> bool {
        self.by_source.contains_key(source)
    }

    pub fn sources(&self) -> Vec<SourceId> {
        let mut v: Vec<SourceId> = self.by_source.keys().cloned().collect();
        v.sort();
        v
    }

    /// Extract with the extractor registered for `source`.
    /// An unregistered source is a setup bug and fails instead of reading as absent.
    pub fn extract(&self, source: &SourceId, document: &[u8]) -> Result<Option<f64>, ConfigError> {
        let extractor = self.get(source).ok_or_else(|| ConfigError::UnknownSource {
            property: None,
            source_id: source.to_string(),
        })?;
        Ok(extractor.extract(document))
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("sources", &self.sources())
            .finish()
    }
}
