//! # Rate Aggregator
//! Reduces all observations for a date to one market rate: the mean of the
//! concrete rates. Absent and unresolved observations are skipped. A date
//! with no concrete rate has no aggregate, which is not the same as zero.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::collect::types::Observation;

/// Mean competitor rate on `date`, or `None` without any usable sample.
///
/// Rates are summed in sorted order so the result does not depend on the
/// order observations were collected in.
pub fn aggregate(observations: &[Observation], date: NaiveDate) -> Option<f64> {
    let rates: Vec<f64> = observations
        .iter()
        .filter(|o| o.date == date)
        .filter_map(Observation::rate)
        .collect();
    mean_sorted(rates)
}

/// Aggregate for every date that has at least one usable sample.
pub fn aggregate_all(observations: &[Observation]) -> BTreeMap<NaiveDate, f64> {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for o in observations {
        if let Some(r) = o.rate() {
            by_date.entry(o.date).or_default().push(r);
        }
    }
    by_date
        .into_iter()
        .filter_map(|(d, rates)| mean_sorted(rates).map(|m| (d, m)))
        .collect()
}

fn mean_sorted(mut rates: Vec<f64>) -> Option<f64> {
    if rates.is_empty() {
        return None;
    }
    rates.sort_by(f64::total_cmp);
    let sum: f64 = rates.iter().sum();
    Some(sum / rates.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::types::RateOutcome;
    use crate::error::FetchError;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn obs(source: &str, date: NaiveDate, outcome: RateOutcome) -> Observation {
        Observation {
            property: "P".into(),
            source: source.into(),
            date,
            outcome,
        }
    }

    #[test]
    fn mean_of_concrete_rates_for_that_date_only() {
        let set = vec![
            obs("agoda", d(1), RateOutcome::Rate(200.0)),
            obs("expedia", d(1), RateOutcome::Rate(240.0)),
            obs("bookingcom", d(1), RateOutcome::Absent),
            obs("agoda", d(2), RateOutcome::Rate(999.0)),
        ];
        assert_eq!(aggregate(&set, d(1)), Some(220.0));
        assert_eq!(aggregate(&set, d(2)), Some(999.0));
    }

    #[test]
    fn no_signal_is_none_not_zero() {
        let set = vec![
            obs("agoda", d(1), RateOutcome::Absent),
            obs(
                "expedia",
                d(1),
                RateOutcome::Unresolved(FetchError::Transport {
                    url: "u".into(),
                    message: "timeout".into(),
                }),
            ),
        ];
        assert_eq!(aggregate(&set, d(1)), None);
        assert_eq!(aggregate(&set, d(3)), None);
        assert!(aggregate_all(&set).is_empty());
    }

    #[test]
    fn aggregate_all_matches_per_date() {
        let set = vec![
            obs("agoda", d(1), RateOutcome::Rate(100.0)),
            obs("agoda", d(2), RateOutcome::Rate(50.0)),
            obs("expedia", d(2), RateOutcome::Rate(70.0)),
        ];
        let all = aggregate_all(&set);
        assert_eq!(all.len(), 2);
        assert_eq!(all[&d(1)], 100.0);
        assert_eq!(all[&d(2)], aggregate(&set, d(2)).unwrap());
    }
}
