// src/collect/fetch.rs
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::collect::types::{Fetcher, Headers};
use crate::error::FetchError;

/// Placeholders understood in listing URLs.
///   `{date}`       → 2025-03-01
///   `{date_day}`   → 01
///   `{date_month}` → 03
///   `{date_year}`  → 2025
const PLACEHOLDERS: [&str; 4] = ["{date}", "{date_day}", "{date_month}", "{date_year}"];

pub fn has_date_placeholder(template: &str) -> bool {
    PLACEHOLDERS.iter().any(|p| template.contains(p))
}

pub fn render_url(template: &str, date: NaiveDate) -> String {
    template
        .replace("{date}", &date.format("%Y-%m-%d").to_string())
        .replace("{date_day}", &date.format("%d").to_string())
        .replace("{date_month}", &date.format("%m").to_string())
        .replace("{date_year}", &date.format("%Y").to_string())
}

/// Plain HTTP GET. Non-2xx answers are reported as `FetchError::Status`.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, headers: &Headers) -> Result<Vec<u8>, FetchError> {
        let mut req = self.client.get(url);
        for (k, v) in headers {
            req = req.header(k.as_str(), v.as_str());
        }

        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let resp = req.send().await.map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await.map_err(transport)?;
        Ok(body.to_vec())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// In-memory fetcher keyed by exact URL, for offline runs and tests.
/// Unknown URLs fail like an unreachable host.
#[derive(Default)]
pub struct FixtureFetcher {
    pages: HashMap<String, Result<Vec<u8>, FetchError>>,
    requested: Mutex<Vec<String>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.pages.insert(url.into(), Ok(body.into()));
        self
    }

    pub fn with_failure(mut self, url: impl Into<String>, err: FetchError) -> Self {
        self.pages.insert(url.into(), Err(err));
        self
    }

    /// URLs requested so far, in request order.
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    async fn fetch(&self, url: &str, _headers: &Headers) -> Result<Vec<u8>, FetchError> {
        if let Ok(mut seen) = self.requested.lock() {
            seen.push(url.to_string());
        }
        match self.pages.get(url) {
            Some(page) => page.clone(),
            None => Err(FetchError::Transport {
                url: url.to_string(),
                message: "no fixture for url".to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
