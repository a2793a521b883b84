// src/config.rs
//! Run configuration: pricing window, base rates, tracked properties, the
//! event calendar, and fetch/output settings.
//!
//! Lookup order for the file:
//! 1) $RATE_ADVISOR_CONFIG
//! 2) config/advisor.toml
//! 3) config/advisor.json
//!
//! Loading only checks shape. Business rules (base rates, event ranges,
//! registered sources) are enforced by [`crate::advisor::Plan::from_config`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::Event;
use crate::collect::types::{Headers, Property};
use crate::error::ConfigError;
use crate::pricing::BaseRates;

pub const ENV_CONFIG_PATH: &str = "RATE_ADVISOR_CONFIG";
pub const DEFAULT_TOML_PATH: &str = "config/advisor.toml";
pub const DEFAULT_JSON_PATH: &str = "config/advisor.json";

/// Inclusive run of `days` consecutive dates starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub days: u32,
}

impl DateWindow {
    pub fn new(start: NaiveDate, days: u32) -> Result<Self, ConfigError> {
        let w = Self { start, days };
        w.validate()?;
        Ok(w)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        Ok(())
    }

    /// Last date in the window.
    pub fn end(&self) -> Option<NaiveDate> {
        let span = u64::from(self.days.checked_sub(1)?);
        self.start.checked_add_days(Days::new(span))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..u64::from(self.days)).filter_map(move |i| start.checked_add_days(Days::new(i)))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.end()
            .is_some_and(|end| self.start <= date && date <= end)
    }
}

fn default_user_agent() -> String {
    concat!("hotel-rate-advisor/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_timeout_secs() -> u64 {
    20
}
fn default_max_concurrent() -> usize {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Extra request headers sent with every fetch.
    #[serde(default)]
    pub headers: Headers,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_concurrent: default_max_concurrent(),
            headers: Headers::new(),
        }
    }
}

impl FetchConfig {
    /// Configured headers plus `User-Agent`, unless one was given explicitly.
    pub fn request_headers(&self) -> Headers {
        let mut h = self.headers.clone();
        if !h.keys().any(|k| k.eq_ignore_ascii_case("user-agent")) {
            h.insert("User-Agent".to_string(), self.user_agent.clone());
        }
        h
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_promotion() -> Option<String> {
    Some("Standard Discount: 10% off direct booking".to_string())
}

fn default_recommendations_path() -> PathBuf {
    PathBuf::from("suggested_daily_rates.csv")
}
fn default_observations_path() -> PathBuf {
    PathBuf::from("competitor_rates.csv")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_recommendations_path")]
    pub recommendations: PathBuf,
    #[serde(default = "default_observations_path")]
    pub observations: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            recommendations: default_recommendations_path(),
            observations: default_observations_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    pub window: DateWindow,
    pub base_rates: BaseRates,
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Order matters: on overlapping dates the first listed event applies.
    #[serde(default)]
    pub events: Vec<Event>,
    /// Offered on dates without an event package. Set to "" for none.
    #[serde(default = "default_promotion")]
    pub default_promotion: Option<String>,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AdvisorConfig {
    /// Load from an explicit path. `.json` is read as JSON, anything else as TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading advisor config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::parse(&content, &ext)
            .with_context(|| format!("parsing advisor config {}", path.display()))
    }

    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        for candidate in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from(&p);
            }
        }
        Err(anyhow!(
            "no advisor config found (set {ENV_CONFIG_PATH} or create {DEFAULT_TOML_PATH})"
        ))
    }

    pub fn parse(content: &str, hint_ext: &str) -> Result<Self> {
        let mut cfg: Self = if hint_ext == "json" {
            serde_json::from_str(content).context("invalid JSON config")?
        } else {
            toml::from_str(content).context("invalid TOML config")?
        };
        cfg.sanitize();
        Ok(cfg)
    }

    fn sanitize(&mut self) {
        if self.fetch.max_concurrent == 0 {
            self.fetch.max_concurrent = 1;
        }
        for p in &mut self.properties {
            p.name = p.name.trim().to_string();
        }
    }
}
