// src/advisor.rs
//! One pricing run: validated plan → collection → per-date market rate →
//! recommendations. Data only flows forward; each stage gets exactly what it
//! needs as arguments.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::aggregate::aggregate_all;
use crate::calendar::EventCalendar;
use crate::collect::extractors::ExtractorRegistry;
use crate::collect::fetch::has_date_placeholder;
use crate::collect::types::{Fetcher, Observation, Property};
use crate::collect::{collect, validate_sources, CollectOptions};
use crate::config::{AdvisorConfig, DateWindow};
use crate::error::ConfigError;
use crate::pricing::{price_window, BaseRates};
use crate::recommendation::{PriceRecommendation, ReasonKind};

/// Configuration that passed every business rule.
#[derive(Debug, Clone)]
pub struct Plan {
    pub properties: Vec<Property>,
    pub window: DateWindow,
    pub base_rates: BaseRates,
    pub calendar: EventCalendar,
    pub collect: CollectOptions,
}

impl Plan {
    /// Check the whole configuration. Nothing has been fetched when this fails.
    pub fn from_config(
        cfg: &AdvisorConfig,
        registry: &ExtractorRegistry,
    ) -> Result<Self, ConfigError> {
        cfg.window.validate()?;
        cfg.base_rates.validate()?;
        let calendar = EventCalendar::new(cfg.events.clone())?
            .with_default_promotion(cfg.default_promotion.clone());

        for p in &cfg.properties {
            for l in &p.listings {
                if !has_date_placeholder(&l.url) {
                    return Err(ConfigError::MissingDatePlaceholder {
                        property: p.name.clone(),
                        source_id: l.source.to_string(),
                        url: l.url.clone(),
                    });
                }
            }
        }
        validate_sources(&cfg.properties, registry)?;

        Ok(Self {
            properties: cfg.properties.clone(),
            window: cfg.window,
            base_rates: cfg.base_rates,
            calendar,
            collect: CollectOptions {
                headers: cfg.fetch.request_headers(),
                max_concurrent: cfg.fetch.max_concurrent.max(1),
            },
        })
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub observations: Vec<Observation>,
    /// Mean competitor rate, only for dates with at least one usable sample.
    pub market: BTreeMap<NaiveDate, f64>,
    pub recommendations: Vec<PriceRecommendation>,
}

impl RunReport {
    pub fn count_by_kind(&self, kind: ReasonKind) -> usize {
        self.recommendations
            .iter()
            .filter(|r| r.kind() == kind)
            .count()
    }
}

pub async fn run_once(
    plan: &Plan,
    registry: &ExtractorRegistry,
    fetcher: Arc<dyn Fetcher>,
) -> Result<RunReport, ConfigError> {
    plan.base_rates.validate()?;

    let observations = collect(
        &plan.properties,
        &plan.window,
        registry,
        fetcher,
        &plan.collect,
    )
    .await?;
    let market = aggregate_all(&observations);
    let recommendations = price_window(&plan.window, &plan.base_rates, &market, &plan.calendar)?;

    let report = RunReport {
        observations,
        market,
        recommendations,
    };
    tracing::info!(
        target: "pricing",
        dates = report.recommendations.len(),
        with_market = report.market.len(),
        base_only = report.count_by_kind(ReasonKind::BaseOnly),
        competitor_adjusted = report.count_by_kind(ReasonKind::CompetitorAdjusted),
        event_adjusted = report.count_by_kind(ReasonKind::EventAdjusted),
        "pricing run finished"
    );
    Ok(report)
}
