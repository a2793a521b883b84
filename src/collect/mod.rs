// src/collect/mod.rs
pub mod extractors;
pub mod fetch;
pub mod html;
pub mod types;

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::collect::extractors::{ExtractorRegistry, RateExtractor};
use crate::collect::fetch::render_url;
use crate::collect::types::{Fetcher, Headers, Observation, Property, RateOutcome, SourceId};
use crate::config::DateWindow;
use crate::error::{ConfigError, FetchError};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "collect_requests_total",
            "Competitor page fetches attempted."
        );
        describe_counter!("collect_rates_total", "Observations with a parsed rate.");
        describe_counter!(
            "collect_absent_total",
            "Pages fetched but no readable price found."
        );
        describe_counter!(
            "collect_fetch_errors_total",
            "Fetches that failed at the transport level."
        );
        describe_histogram!("collect_fetch_ms", "Fetch duration in milliseconds.");
        describe_gauge!(
            "collect_last_run_ts",
            "Unix ts when a collection run last finished."
        );
    });
}

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub headers: Headers,
    /// Upper bound on fetches in flight. 1 means strictly sequential.
    pub max_concurrent: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            headers: Headers::new(),
            max_concurrent: 4,
        }
    }
}

/// Counts by outcome, for run summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub rates: usize,
    pub absent: usize,
    pub unresolved: usize,
}

impl CollectStats {
    pub fn of(observations: &[Observation]) -> Self {
        let mut s = Self::default();
        for o in observations {
            match o.outcome {
                RateOutcome::Rate(_) => s.rates += 1,
                RateOutcome::Absent => s.absent += 1,
                RateOutcome::Unresolved(_) => s.unresolved += 1,
            }
        }
        s
    }
}

/// Every listing must have an extractor before anything is fetched.
pub fn validate_sources(
    properties: &[Property],
    registry: &ExtractorRegistry,
) -> Result<(), ConfigError> {
    for p in properties {
        for l in &p.listings {
            if !registry.contains(&l.source) {
                return Err(ConfigError::UnknownSource {
                    property: Some(p.name.clone()),
                    source_id: l.source.to_string(),
                });
            }
        }
    }
    Ok(())
}

struct Job {
    property: String,
    source: SourceId,
    date: NaiveDate,
    url: String,
}

/// Fetch and extract every (property, listing, date) in the window.
///
/// Produces exactly one observation per triple. Failed fetches become
/// `RateOutcome::Unresolved` and never abort the run; the only error is an
/// unregistered source, reported before the first request.
pub async fn collect(
    properties: &[Property],
    window: &DateWindow,
    registry: &ExtractorRegistry,
    fetcher: Arc<dyn Fetcher>,
    opts: &CollectOptions,
) -> Result<Vec<Observation>, ConfigError> {
    ensure_metrics_described();
    validate_sources(properties, registry)?;

    let started = Instant::now();
    let permits = Arc::new(Semaphore::new(opts.max_concurrent.max(1)));
    let headers = Arc::new(opts.headers.clone());

    let mut jobs = Vec::new();
    let mut tasks = JoinSet::new();
    for property in properties {
        for listing in &property.listings {
            let extractor = registry
                .get(&listing.source)
                .ok_or_else(|| ConfigError::UnknownSource {
                    property: Some(property.name.clone()),
                    source_id: listing.source.to_string(),
                })?;
            for date in window.dates() {
                let job = Job {
                    property: property.name.clone(),
                    source: listing.source.clone(),
                    date,
                    url: render_url(&listing.url, date),
                };

                let permits = Arc::clone(&permits);
                let fetcher = Arc::clone(&fetcher);
                let headers = Arc::clone(&headers);
                let extractor = Arc::clone(&extractor);
                let index = jobs.len();
                let (property, source, url) =
                    (job.property.clone(), job.source.clone(), job.url.clone());

                tasks.spawn(async move {
                    // The semaphore is never closed; a failed acquire just runs unbounded.
                    let _permit = permits.acquire_owned().await.ok();
                    let outcome =
                        observe(fetcher.as_ref(), extractor.as_ref(), &url, &headers).await;
                    let obs = Observation {
                        property,
                        source,
                        date,
                        outcome,
                    };
                    (index, obs)
                });
                jobs.push(job);
            }
        }
    }

    // One slot per job. Listings may repeat a source for the same property,
    // so slots are keyed by job index rather than by triple.
    let mut slots: Vec<Option<Observation>> = vec![None; jobs.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, obs)) => slots[index] = Some(obs),
            Err(e) => tracing::error!(target: "collect", error = ?e, "collection task failed"),
        }
    }

    // A task that died still owes its job an observation.
    let mut out: Vec<Observation> = slots
        .into_iter()
        .zip(jobs)
        .map(|(slot, job)| {
            slot.unwrap_or_else(|| Observation {
                outcome: RateOutcome::Unresolved(FetchError::Transport {
                    url: job.url,
                    message: "collection task aborted".to_string(),
                }),
                property: job.property,
                source: job.source,
                date: job.date,
            })
        })
        .collect();

    out.sort_by(|a, b| {
        (a.property.as_str(), &a.source, a.date).cmp(&(b.property.as_str(), &b.source, b.date))
    });

    let stats = CollectStats::of(&out);
    gauge!("collect_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
    tracing::info!(
        target: "collect",
        observations = out.len(),
        rates = stats.rates,
        absent = stats.absent,
        unresolved = stats.unresolved,
        fetcher = fetcher.name(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "collection finished"
    );

    Ok(out)
}

async fn observe(
    fetcher: &dyn Fetcher,
    extractor: &dyn RateExtractor,
    url: &str,
    headers: &Headers,
) -> RateOutcome {
    counter!("collect_requests_total").increment(1);
    let t0 = Instant::now();
    let fetched = fetcher.fetch(url, headers).await;
    histogram!("collect_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

    match fetched {
        Ok(body) => match extractor.extract(&body) {
            Some(rate) => {
                counter!("collect_rates_total").increment(1);
                RateOutcome::Rate(rate)
            }
            None => {
                counter!("collect_absent_total").increment(1);
                tracing::debug!(target: "collect", source = %extractor.source(), url, "no price on page");
                RateOutcome::Absent
            }
        },
        Err(e) => {
            counter!("collect_fetch_errors_total").increment(1);
            tracing::warn!(target: "collect", error = %e, source = %extractor.source(), "fetch failed");
            RateOutcome::Unresolved(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::fetch::FixtureFetcher;
    use crate::collect::types::Listing;

    fn window(days: u32) -> DateWindow {
        DateWindow {
            start: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            days,
        }
    }

    fn prop(name: &str, source: &str, url: &str) -> Property {
        Property {
            name: name.into(),
            listings: vec![Listing {
                source: source.into(),
                url: url.into(),
            }],
        }
    }

    #[tokio::test]
    async fn unknown_source_fails_before_any_fetch() {
        let fetcher = Arc::new(FixtureFetcher::new());
        let props = vec![
            prop("A", "agoda", "a?{date}"),
            prop("B", "traveloka", "t?{date}"),
        ];
        let err = collect(
            &props,
            &window(3),
            &ExtractorRegistry::builtin(),
            fetcher.clone(),
            &CollectOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownSource { property: Some(ref p), .. } if p == "B"
        ));
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn one_observation_per_triple_sorted() {
        let page = r#"<span class="price-summary-price-value">S$150</span>"#;
        let fetcher = FixtureFetcher::new()
            .with_page("e?2025-03-01", page)
            .with_page("e?2025-03-02", "<html></html>");
        // 2025-03-03 has no fixture → transport failure
        let props = vec![prop("Clarke Quay", "expedia", "e?{date}")];
        let obs = collect(
            &props,
            &window(3),
            &ExtractorRegistry::builtin(),
            Arc::new(fetcher),
            &CollectOptions {
                max_concurrent: 2,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(obs.len(), 3);
        assert_eq!(obs[0].outcome, RateOutcome::Rate(150.0));
        assert_eq!(obs[1].outcome, RateOutcome::Absent);
        assert!(obs[2].is_unresolved());
        assert_eq!(
            CollectStats::of(&obs),
            CollectStats {
                rates: 1,
                absent: 1,
                unresolved: 1
            }
        );
    }

    /// Serves a fixed page, except for one URL whose task panics mid-fetch.
    struct PanicsOn {
        url: &'static str,
        page: &'static str,
    }

    #[async_trait::async_trait]
    impl Fetcher for PanicsOn {
        async fn fetch(&self, url: &str, _headers: &Headers) -> Result<Vec<u8>, FetchError> {
            if url == self.url {
                panic!("fetcher blew up on {url}");
            }
            Ok(self.page.as_bytes().to_vec())
        }

        fn name(&self) -> &'static str {
            "panics-on"
        }
    }

    #[tokio::test]
    async fn aborted_task_is_recovered_per_listing() {
        // Two listings on the same source for one property: the triples collide.
        let props = vec![Property {
            name: "Clarke Quay".into(),
            listings: vec![
                Listing {
                    source: "expedia".into(),
                    url: "e1?{date}".into(),
                },
                Listing {
                    source: "expedia".into(),
                    url: "e2?{date}".into(),
                },
            ],
        }];
        let fetcher = PanicsOn {
            url: "e2?2025-03-01",
            page: r#"<span class="price-summary-price-value">S$150</span>"#,
        };
        let obs = collect(
            &props,
            &window(2),
            &ExtractorRegistry::builtin(),
            Arc::new(fetcher),
            &CollectOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(obs.len(), 4);
        let aborted: Vec<&Observation> = obs.iter().filter(|o| o.is_unresolved()).collect();
        assert_eq!(aborted.len(), 1);
        assert_eq!(aborted[0].date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert!(matches!(
            &aborted[0].outcome,
            RateOutcome::Unresolved(FetchError::Transport { url, .. }) if url == "e2?2025-03-01"
        ));
        assert_eq!(CollectStats::of(&obs).rates, 3);
    }
}
