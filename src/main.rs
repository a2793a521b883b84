//! Rate advisor — binary entrypoint.
//! Loads the run configuration, collects competitor rates, prices the window,
//! and writes the recommendation and observation tables as CSV.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hotel_rate_advisor::collect::fetch::HttpFetcher;
use hotel_rate_advisor::config::AdvisorConfig;
use hotel_rate_advisor::report::{save_csv, write_observations, write_recommendations};
use hotel_rate_advisor::{run_once, ExtractorRegistry, Plan, DEFAULT_LOG_FILTER};

/// Compact logs by default; `RATE_ADVISOR_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let json = std::env::var("RATE_ADVISOR_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AdvisorConfig::load_default()?;
    let registry = ExtractorRegistry::builtin();

    let plan = match Plan::from_config(&cfg, &registry) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration, nothing fetched");
            return Err(e.into());
        }
    };
    for s in plan.calendar.shadowed() {
        tracing::warn!(
            winner = %s.winner,
            loser = %s.loser,
            from = %s.from,
            to = %s.to,
            "overlapping events; the earlier one applies on shared dates"
        );
    }

    let fetcher = HttpFetcher::new(cfg.fetch.timeout()).context("building http client")?;
    let report = run_once(&plan, &registry, Arc::new(fetcher)).await?;

    save_csv(&cfg.output.observations, |w| {
        write_observations(w, &report.observations)
    })?;
    save_csv(&cfg.output.recommendations, |w| {
        write_recommendations(w, &report.recommendations)
    })?;

    tracing::info!(
        observations = %cfg.output.observations.display(),
        recommendations = %cfg.output.recommendations.display(),
        "reports written"
    );
    Ok(())
}
