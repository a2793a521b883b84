// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod advisor;
pub mod aggregate;
pub mod calendar;
pub mod collect;
pub mod config;
pub mod error;
pub mod pricing;
pub mod recommendation;
pub mod report;

/// Log filter used when `RUST_LOG` is unset. Library events carry their stage
/// as the target (`collect`, `pricing`, `calendar`), so each is named here.
pub const DEFAULT_LOG_FILTER: &str =
    "hotel_rate_advisor=info,rate_advisor=info,collect=info,pricing=info,calendar=info,warn";

// ---- Re-exports for stable public API ----
pub use crate::advisor::{run_once, Plan, RunReport};
pub use crate::calendar::{Event, EventCalendar};
pub use crate::collect::extractors::{ExtractorRegistry, RateExtractor};
pub use crate::collect::types::{Fetcher, Observation, Property, RateOutcome, SourceId};
pub use crate::error::{ConfigError, FetchError};
pub use crate::pricing::{recommend, BaseRates};
pub use crate::recommendation::{PriceRecommendation, ReasonKind};
