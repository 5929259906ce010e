//! Page retrieval with exponential backoff.
//!
//! - [`FetchPage`]: async page download returning the body as text
//! - [`HttpFetcher`]: reqwest-backed implementation sending a browser user agent
//! - [`RetryFetch`]: decorator retrying any [`FetchPage`]
//!
//! # Retry Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```

use rand::{Rng, rng};
use reqwest::Client;
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Upper bound for a single backoff delay.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);
const MAX_JITTER_MS: u64 = 250;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Download a page.
pub trait FetchPage {
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// Plain HTTP GET with a fixed user agent. Non-2xx statuses are errors.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build an HTTP client sending `user_agent` with a 30 second timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(user_agent: &str) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            bytes = body.len(),
            "Fetched page"
        );
        Ok(body)
    }
}

/// Retries the wrapped fetcher with exponential backoff and jitter.
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl<T: FetchPage> RetryFetch<T> {
    /// # Arguments
    ///
    /// * `inner` - Fetcher to wrap
    /// * `max_retries` - Attempts after the first before giving up
    /// * `base_delay` - Delay before the first retry, doubled for each later one
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: MAX_RETRY_DELAY,
        }
    }

    /// Backoff before retry number `attempt` (1-based), without jitter.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let shift = attempt.saturating_sub(1).min(31) as u32;
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T: FetchPage> FetchPage for RetryFetch<T> {
    #[instrument(level = "info", skip_all, fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    let elapsed_ms_total = total_t0.elapsed().as_millis() as u64;

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total,
                            error = %e,
                            "fetch exhausted retries"
                        );
                        return Err(e);
                    }

                    let jitter_ms: u64 = rng().random_range(0..=MAX_JITTER_MS);
                    let delay = self.backoff(attempt) + Duration::from_millis(jitter_ms);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total,
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned responses in order, recording requested URLs.
    pub(crate) struct ScriptedFetcher {
        responses: RefCell<VecDeque<Result<String, String>>>,
        pub(crate) requests: RefCell<Vec<String>>,
    }

    impl ScriptedFetcher {
        pub(crate) fn new(responses: Vec<Result<String, String>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl FetchPage for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
            self.requests.borrow_mut().push(url.to_string());
            match self.responses.borrow_mut().pop_front() {
                Some(Ok(body)) => Ok(body),
                Some(Err(message)) => Err(message.into()),
                None => Err("script exhausted".into()),
            }
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_after_failures() {
        let inner = ScriptedFetcher::new(vec![
            Err("connection reset".to_string()),
            Err("503".to_string()),
            Ok("<html></html>".to_string()),
        ]);
        let fetcher = RetryFetch::new(inner, 3, Duration::from_millis(1));
        let body = fetcher.fetch("https://finviz.com/quote.ashx?t=AAPL").await.unwrap();
        assert_eq!(body, "<html></html>");
        assert_eq!(fetcher.inner.requests.borrow().len(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let inner = ScriptedFetcher::new(vec![
            Err("a".to_string()),
            Err("b".to_string()),
            Err("c".to_string()),
        ]);
        let fetcher = RetryFetch::new(inner, 2, Duration::from_millis(1));
        let err = fetcher.fetch("https://finviz.com").await.unwrap_err();
        assert_eq!(err.to_string(), "c");
        assert_eq!(fetcher.inner.requests.borrow().len(), 3);
    }

    #[tokio::test]
    async fn test_no_retries_configured() {
        let inner = ScriptedFetcher::new(vec![Err("down".to_string()), Ok("late".to_string())]);
        let fetcher = RetryFetch::new(inner, 0, Duration::from_millis(1));
        assert!(fetcher.fetch("https://finviz.com").await.is_err());
        assert_eq!(fetcher.inner.requests.borrow().len(), 1);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let fetcher = RetryFetch::new(ScriptedFetcher::new(vec![]), 10, Duration::from_millis(500));
        assert_eq!(fetcher.backoff(1), Duration::from_millis(500));
        assert_eq!(fetcher.backoff(2), Duration::from_millis(1000));
        assert_eq!(fetcher.backoff(3), Duration::from_millis(2000));
        assert_eq!(fetcher.backoff(6), MAX_RETRY_DELAY);
        assert_eq!(fetcher.backoff(64), MAX_RETRY_DELAY);
    }
}
