// src/report.rs
//! Tabular output: the recommendation table keyed by date and the raw
//! observation table. Rates are rounded to cents here and nowhere else.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::collect::types::{Observation, RateOutcome};
use crate::recommendation::{round2, PriceRecommendation};

pub const RECOMMENDATION_HEADER: [&str; 9] = [
    "Date",
    "Day of Week",
    "Base Rate",
    "Suggested Rate",
    "Reason",
    "Reason Detail",
    "Competitor Rate",
    "Event",
    "Promotion",
];

pub const OBSERVATION_HEADER: [&str; 5] = ["Hotel", "Website", "Date", "Room Rate", "Status"];

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write one CSV row, quoting fields that need it.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\n")
}

fn money(x: f64) -> String {
    format!("{:.2}", round2(x))
}

pub fn recommendation_row(r: &PriceRecommendation) -> [String; 9] {
    [
        r.date.format("%Y-%m-%d").to_string(),
        r.date.format("%A").to_string(),
        money(r.base_rate),
        money(r.suggested_rate),
        r.reason.kind.to_string(),
        r.reason.message.clone(),
        r.competitor_rate.map(money).unwrap_or_default(),
        r.event.clone().unwrap_or_default(),
        r.promotion.clone().unwrap_or_default(),
    ]
}

pub fn write_recommendations<W: Write>(mut w: W, recs: &[PriceRecommendation]) -> io::Result<()> {
    write_row(&mut w, &RECOMMENDATION_HEADER)?;
    for r in recs {
        write_row(&mut w, &recommendation_row(r))?;
    }
    w.flush()
}

/// Absent and unresolved rows keep an empty rate; `Status` says which.
pub fn write_observations<W: Write>(mut w: W, observations: &[Observation]) -> io::Result<()> {
    write_row(&mut w, &OBSERVATION_HEADER)?;
    for o in observations {
        let (rate, status) = match &o.outcome {
            RateOutcome::Rate(r) => (money(*r), "rate".to_string()),
            RateOutcome::Absent => (String::new(), "absent".to_string()),
            RateOutcome::Unresolved(e) => (String::new(), format!("unresolved: {e}")),
        };
        write_row(
            &mut w,
            &[
                o.property.clone(),
                o.source.to_string(),
                o.date.format("%Y-%m-%d").to_string(),
                rate,
                status,
            ],
        )?;
    }
    w.flush()
}

/// Create `path` and hand a buffered writer to `write`.
pub fn save_csv<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);
    write(&mut w).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
