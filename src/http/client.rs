//! HTTP client wrapping wreq with status retries and request throttling.

use super::error::FetchError;
use crate::config::Config;
use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::{Client, Response};

/// Statuses retried before giving up.
const RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// Trait for page and image retrieval - enables mocking for tests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a page body as text. Non-success statuses are errors.
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;

    /// Fetches raw bytes within `timeout`, returning whatever status came back.
    async fn get_bytes(&self, url: &str, timeout: Duration) -> Result<FetchedBytes, FetchError>;
}

/// Status and body of a binary download.
#[derive(Debug, Clone)]
pub struct FetchedBytes {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Exponential backoff on server errors: `backoff`, `2 * backoff`, `4 * backoff`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self { max_retries, backoff }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Returns true if another attempt is allowed after `attempt` retries.
    pub fn allows(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Returns true if `status` should be retried after `attempt` retries.
    pub fn should_retry(&self, status: u16, attempt: u32) -> bool {
        self.allows(attempt) && RETRY_STATUSES.contains(&status)
    }

    /// Sleep before retry number `attempt + 1`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Random pause inserted after every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    min_ms: u64,
    max_ms: u64,
}

impl Throttle {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms: min_ms.min(max_ms), max_ms: max_ms.max(min_ms) }
    }

    pub fn disabled() -> Self {
        Self::new(0, 0)
    }

    fn pick_ms(&self) -> u64 {
        if self.max_ms == 0 {
            return 0;
        }
        rand::rng().random_range(self.min_ms..=self.max_ms)
    }

    /// Sleeps for a random duration within the configured bounds.
    pub async fn pause(&self) {
        let ms = self.pick_ms();
        if ms == 0 {
            return;
        }

        debug!("Pausing {}ms", ms);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Shared HTTP client; one connection pool is reused for the whole run.
pub struct HttpClient {
    client: Client,
    user_agent: String,
    retry: RetryPolicy,
    throttle: Throttle,
}

impl HttpClient {
    /// Creates a client from the configured retry, delay, and header settings.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_policies(
            &config.user_agent,
            RetryPolicy::new(config.max_retries, config.backoff()),
            Throttle::new(config.delay_min_ms, config.delay_max_ms),
        )
    }

    /// Creates a client with explicit policies (tests use no backoff and no pauses).
    pub fn with_policies(user_agent: &str, retry: RetryPolicy, throttle: Throttle) -> Result<Self> {
        let client = Client::builder().cookie_store(true).gzip(true).brotli(true).build()?;

        Ok(Self { client, user_agent: user_agent.to_string(), retry, throttle })
    }

    /// Sends a GET, retrying server errors and transport failures.
    async fn execute(&self, url: &str) -> Result<Response, FetchError> {
        let mut attempt = 0;

        loop {
            debug!("GET {}", url);

            match self.client.get(url).header("User-Agent", self.user_agent.as_str()).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if !self.retry.should_retry(status, attempt) {
                        debug!("Response status: {}", status);
                        return Ok(response);
                    }
                    warn!(
                        "{} returned {}, retrying ({}/{})",
                        url,
                        status,
                        attempt + 1,
                        self.retry.max_retries
                    );
                }
                Err(e) => {
                    if !self.retry.allows(attempt) {
                        return Err(e.into());
                    }
                    warn!(
                        "Request to {} failed: {}, retrying ({}/{})",
                        url,
                        e,
                        attempt + 1,
                        self.retry.max_retries
                    );
                }
            }

            let backoff = self.retry.backoff(attempt);
            if !backoff.is_zero() {
                tokio::time::sleep(backoff).await;
            }
            attempt += 1;
        }
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.execute(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), url: url.to_string() });
        }

        Ok(response.text().await?)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<FetchedBytes, FetchError> {
        let response = self.execute(url).await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(FetchedBytes { status, body: body.to_vec() })
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let result = self.fetch_text(url).await;
        self.throttle.pause().await;
        result
    }

    async fn get_bytes(&self, url: &str, timeout: Duration) -> Result<FetchedBytes, FetchError> {
        let result = tokio::time::timeout(timeout, self.fetch_bytes(url))
            .await
            .unwrap_or(Err(FetchError::Timeout(timeout)));
        self.throttle.pause().await;
        result
    }
}
