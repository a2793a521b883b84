//! # Pricing Engine
//! Pure, testable rule that maps `(date, base rates, market rate, event)` to a
//! `PriceRecommendation`. No I/O and no state carried between dates.
//!
//! Policy:
//! 1. Base: weekend rate Friday through Sunday, weekday rate otherwise.
//! 2. Competitor floor: never more than 10% under the market average, but the
//!    market alone never pushes the price below base.
//! 3. Event: multiply by the one event the calendar resolves for the date.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{Event, EventCalendar};
use crate::config::DateWindow;
use crate::error::ConfigError;
use crate::recommendation::{PriceRecommendation, Reason, ReasonKind};

/// Share of the market average the suggested rate is held to.
pub const COMPETITOR_FLOOR_RATIO: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseRates {
    pub weekday: f64,
    pub weekend: f64,
}

impl BaseRates {
    pub fn new(weekday: f64, weekend: f64) -> Result<Self, ConfigError> {
        let b = Self { weekday, weekend };
        b.validate()?;
        Ok(b)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (which, value) in [("weekday", self.weekday), ("weekend", self.weekend)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidBaseRate { which, value });
            }
        }
        Ok(())
    }

    pub fn for_date(&self, date: NaiveDate) -> f64 {
        if is_weekend(date) {
            self.weekend
        } else {
            self.weekday
        }
    }
}

/// Friday, Saturday and Sunday. Friday nights are priced as weekend.
pub fn is_weekend(date: NaiveDate) -> bool {
    date.weekday().num_days_from_monday() >= 4
}

/// Price a single date. Inputs are assumed valid; see [`price_window`].
pub fn recommend(
    date: NaiveDate,
    base: &BaseRates,
    competitor_rate: Option<f64>,
    event: Option<&Event>,
) -> PriceRecommendation {
    let base_rate = base.for_date(date);
    let day_kind = if is_weekend(date) { "Weekend" } else { "Weekday" };

    // 1) + 2) base and competitor floor
    let mut candidate = base_rate;
    let mut reason = Reason::new(ReasonKind::BaseOnly, format!("{day_kind} base rate"));
    if let Some(market) = competitor_rate {
        let floor = market * COMPETITOR_FLOOR_RATIO;
        if floor > candidate {
            candidate = floor;
            reason = Reason::new(
                ReasonKind::CompetitorAdjusted,
                format!("Held within 10% of market average {market:.2}"),
            );
        } else {
            reason.message = format!("{day_kind} base rate (market average {market:.2})");
        }
    }

    // 3) event multiplier, at most one
    if let Some(ev) = event {
        candidate *= ev.multiplier;
        reason = Reason::new(
            ReasonKind::EventAdjusted,
            format!("{} demand x{:.2}", ev.name, ev.multiplier),
        );
    }

    PriceRecommendation {
        date,
        base_rate,
        suggested_rate: candidate,
        competitor_rate,
        event: event.map(|e| e.name.clone()),
        reason,
        promotion: event.and_then(|e| e.promotion.clone()),
    }
}

/// Price every date in the window. Base rates are checked once up front so a
/// bad configuration fails the whole run rather than individual dates. The
/// promotion comes from the calendar, including its default.
pub fn price_window(
    window: &DateWindow,
    base: &BaseRates,
    market: &BTreeMap<NaiveDate, f64>,
    calendar: &EventCalendar,
) -> Result<Vec<PriceRecommendation>, ConfigError> {
    base.validate()?;
    window.validate()?;

    let out = window
        .dates()
        .map(|date| {
            let event = calendar.resolve(date);
            if let Some(ev) = event {
                tracing::debug!(
                    target: "pricing",
                    %date,
                    event = %ev.name,
                    multiplier = ev.multiplier,
                    "applying event multiplier"
                );
            }
            let mut rec = recommend(date, base, market.get(&date).copied(), event);
            rec.promotion = calendar.promotion_for(date).map(str::to_owned);
            rec
        })
        .collect();
    Ok(out)
}
