//! # Event Calendar
//! Demand events as inclusive date ranges with a price multiplier.
//!
//! Events may overlap. Resolution walks the events in configured order and
//! stops at the first one covering the date, so an operator who wants an
//! event to win on shared dates lists it earlier.
//!
//! Each event may name a promotion package. Dates without an event, or whose
//! event names none, get the calendar's default promotion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub start: NaiveDate,
    /// Inclusive.
    pub end: NaiveDate,
    pub multiplier: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

impl Event {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, other: &Event) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// A later event that loses to an earlier one on every date they share.
#[derive(Debug, Clone, PartialEq)]
pub struct Shadowed {
    pub winner: String,
    pub loser: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Read-only, ordered set of validated events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventCalendar {
    events: Vec<Event>,
    default_promotion: Option<String>,
}

impl EventCalendar {
    /// Rejects events that end before they start, and multipliers that are
    /// not finite or are negative. Multipliers below 1.0 are allowed.
    pub fn new(events: Vec<Event>) -> Result<Self, ConfigError> {
        for ev in &events {
            if ev.end < ev.start {
                return Err(ConfigError::InvalidEventRange {
                    name: ev.name.clone(),
                    start: ev.start,
                    end: ev.end,
                });
            }
            if !ev.multiplier.is_finite() || ev.multiplier < 0.0 {
                return Err(ConfigError::InvalidMultiplier {
                    name: ev.name.clone(),
                    multiplier: ev.multiplier,
                });
            }
            if ev.multiplier < 1.0 {
                tracing::warn!(
                    target: "calendar",
                    event = %ev.name,
                    multiplier = ev.multiplier,
                    "event multiplier lowers the price"
                );
            }
        }
        Ok(Self {
            events,
            default_promotion: None,
        })
    }

    /// Promotion for dates no event claims. Blank text means none.
    pub fn with_default_promotion(mut self, promotion: Option<String>) -> Self {
        self.default_promotion = promotion
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        self
    }

    pub fn default_promotion(&self) -> Option<&str> {
        self.default_promotion.as_deref()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The single event that applies on `date`: first in configured order.
    pub fn resolve(&self, date: NaiveDate) -> Option<&Event> {
        self.events.iter().find(|ev| ev.is_active_on(date))
    }

    /// Promotion of the resolved event, falling back to the default.
    pub fn promotion_for(&self, date: NaiveDate) -> Option<&str> {
        self.resolve(date)
            .and_then(|ev| ev.promotion.as_deref())
            .or(self.default_promotion())
    }

    /// Every event covering `date`, in configured order. Diagnostics only.
    pub fn active_on(&self, date: NaiveDate) -> Vec<&Event> {
        self.events.iter().filter(|ev| ev.is_active_on(date)).collect()
    }

    /// Pairs of overlapping events, with the date span on which the earlier
    /// one takes precedence.
    pub fn shadowed(&self) -> Vec<Shadowed> {
        let mut out = Vec::new();
        for (i, first) in self.events.iter().enumerate() {
            for later in &self.events[i + 1..] {
                if first.overlaps(later) {
                    out.push(Shadowed {
                        winner: first.name.clone(),
                        loser: later.name.clone(),
                        from: first.start.max(later.start),
                        to: first.end.min(later.end),
                    });
                }
            }
        }
        out
    }
}
