use anyhow::{Context, Result};
use chrono::Local;
use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::normalize::{self, FeedFormatError, Headline};
use crate::recency;

const USER_AGENT: &str = concat!("NewsBrief/", env!("CARGO_PKG_VERSION"));

/// Failures surfaced by the feed pipeline. Converted into a
/// `FeedFetchOutcome` envelope at the route boundary, never thrown across it.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to fetch feed: {status_text} (status: {status})")]
    Fetch { status: u16, status_text: String },
    #[error("network error during feed fetch: {0}")]
    Network(#[from] reqwest::Error),
    #[error(transparent)]
    Format(#[from] FeedFormatError),
}

struct CachedBody {
    fetched_at: Instant,
    body: String,
}

/// Fetches the fixed feed endpoint, reusing a previously fetched body within
/// the freshness window, and hands the markup to the normalizer and the
/// recency filter.
pub struct FeedClient {
    url: String,
    window_days: i64,
    max_age: Duration,
    client: Client,
    cache: Mutex<Option<CachedBody>>,
}

impl FeedClient {
    pub fn new(
        url: impl Into<String>,
        window_days: i64,
        cache_seconds: u64,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            url: url.into(),
            window_days,
            max_age: Duration::from_secs(cache_seconds),
            client,
            cache: Mutex::new(None),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    /// Fetch the raw feed body, reusing the cached copy while it is fresh.
    /// Single attempt per request: a failed fetch keeps whatever was cached
    /// before and the user may re-trigger manually.
    pub async fn fetch_raw(&self) -> Result<String, FeedError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < self.max_age {
                tracing::debug!(url = %self.url, "serving feed body from cache");
                return Ok(cached.body.clone());
            }
        }

        tracing::info!(url = %self.url, "fetching feed");
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Fetch {
                status: status.as_u16(),
                status_text: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }

        let body = response.text().await?;
        *cache = Some(CachedBody {
            fetched_at: Instant::now(),
            body: body.clone(),
        });
        Ok(body)
    }

    /// Normalized headlines from the feed, filtered to the configured
    /// trailing window ending at the current local instant and sorted
    /// descending by publication time.
    pub async fn recent_headlines(&self) -> Result<Vec<Headline>, FeedError> {
        let body = self.fetch_raw().await?;
        let headlines = normalize::parse_feed(&body)?;
        Ok(recency::filter_recent(
            headlines,
            Local::now(),
            self.window_days,
        ))
    }
}
