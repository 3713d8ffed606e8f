//! Fetching of blocklist sources.
//!
//! This module defines two structs, [`Client`] and [`ClientBuilder`].
//! `Client` performs the actual requests and owns the retry loop;
//! `ClientBuilder` exposes a finer level of granularity for building
//! a `Client`.
use std::time::Duration;

use http::{
    header::{self, HeaderMap, HeaderValue},
    StatusCode,
};
use log::{debug, info, warn};
use tokio::time::sleep;
use typed_builder::TypedBuilder;
use url::Url;

use crate::{retry::RetryExt, ErrorKind, Result};

/// Default number of attempts before a source is deemed as failed, 5.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 5;
/// Default base wait time in seconds for the exponential backoff after a
/// rate limit, 5.
pub const DEFAULT_BACKOFF_BASE_SECS: u64 = 5;
/// Default timeout in seconds before a request is deemed as failed, 30.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default number of sources fetched concurrently, 3.
pub const DEFAULT_MAX_CONCURRENCY: usize = 3;
/// Default pause in seconds after each completed source before its slot is
/// handed to the next one, 1.
pub const DEFAULT_PACING_DELAY_SECS: u64 = 1;
/// Default user agent sent to the blocklist mirrors.
pub const DEFAULT_USER_AGENT: &str = "MyBlocklistFetcher/1.0";

/// Builder for [`Client`].
///
/// See crate-level documentation for usage example.
#[derive(TypedBuilder, Debug, Clone)]
pub struct ClientBuilder {
    /// User agent sent with every request.
    ///
    /// Some mirrors reject requests without one.
    #[builder(default = DEFAULT_USER_AGENT.to_string(), setter(into))]
    user_agent: String,
    /// Timeout for a single request.
    ///
    /// Applies per attempt, not per source.
    #[builder(default = Duration::from_secs(DEFAULT_TIMEOUT_SECS))]
    timeout: Duration,
    /// Maximum number of attempts per source.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u64,
    /// Base wait time for the exponential backoff after a rate limit.
    ///
    /// The n-th rate-limited attempt waits `backoff_base * 2^(n-1)` before
    /// the next one.
    #[builder(default = Duration::from_secs(DEFAULT_BACKOFF_BASE_SECS))]
    backoff_base: Duration,
    /// Cap for the underlying connection pool.
    ///
    /// Kept equal to the logical fetch concurrency so that neither bound
    /// starves the other.
    #[builder(default = DEFAULT_MAX_CONCURRENCY)]
    max_concurrency: usize,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientBuilder {
    /// Instantiate a [`Client`].
    ///
    /// # Errors
    ///
    /// Returns an error if the user agent is not a valid header value or
    /// the underlying reqwest client cannot be created.
    pub fn client(&self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_str(&self.user_agent)?);

        let reqwest_client = reqwest::ClientBuilder::new()
            .gzip(true)
            .default_headers(headers)
            .timeout(self.timeout)
            .pool_max_idle_per_host(self.max_concurrency)
            .build()?;

        Ok(Client {
            reqwest_client,
            max_attempts: self.max_attempts,
            backoff_base: self.backoff_base,
        })
    }
}

/// Handles incoming requests and returns responses.
#[derive(Debug, Clone)]
pub struct Client {
    /// Underlying `reqwest` client instance that handles the HTTP requests.
    reqwest_client: reqwest::Client,
    max_attempts: u64,
    backoff_base: Duration,
}

impl Client {
    /// Fetch the raw text of a single blocklist source.
    ///
    /// Retries up to the configured number of attempts. A rate-limited
    /// attempt waits with exponential backoff before the next one; every
    /// other failure moves on immediately. The first success ends the loop.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::RetriesExhausted` if no attempt delivered a
    /// body. Per-attempt errors are logged, never surfaced.
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        let mut backoff = self.backoff_base;

        for attempt in 1..=self.max_attempts {
            match self.fetch_once(url).await {
                Ok(body) => {
                    info!("Fetched {url}");
                    return Ok(body);
                }
                Err(e) if e.is_rate_limited() => {
                    warn!(
                        "429 Too Many Requests for {url} (attempt {attempt}/{}), waiting {}s",
                        self.max_attempts,
                        backoff.as_secs_f64()
                    );
                    // No pause after the final attempt; there is nothing
                    // left to wait for.
                    if attempt < self.max_attempts {
                        sleep(backoff).await;
                        backoff = backoff.saturating_mul(2);
                    }
                }
                Err(e) => {
                    warn!(
                        "Error for {url} (attempt {attempt}/{}): {e}",
                        self.max_attempts
                    );
                }
            }
        }

        Err(ErrorKind::RetriesExhausted(url.clone(), self.max_attempts))
    }

    /// Issue a single GET request and read the body.
    async fn fetch_once(&self, url: &Url) -> Result<String> {
        debug!("GET {url}");
        let response = self.reqwest_client.get(url.clone()).send().await?;
        let code: StatusCode = response.status();
        if !code.is_success() {
            return Err(ErrorKind::RejectedStatusCode(code));
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use pretty_assertions::assert_eq;
    use url::Url;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::ClientBuilder;
    use crate::ErrorKind;

    fn mock_url(server: &MockServer) -> Url {
        Url::parse(&server.uri()).expect("Expected valid mock server URL")
    }

    #[tokio::test]
    async fn test_fetch_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("10.0.0.0/8\n"))
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::default().client().unwrap();
        let body = client.fetch(&mock_url(&mock_server)).await.unwrap();
        assert_eq!(body, "10.0.0.0/8\n");
    }

    #[tokio::test]
    async fn test_sends_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "MyBlocklistFetcher/1.0"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::default().client().unwrap();
        client.fetch(&mock_url(&mock_server)).await.unwrap();
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let mock_server = MockServer::start().await;
        // A plain server error is retried immediately, once per attempt.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::builder()
            .max_attempts(3u64)
            .build()
            .client()
            .unwrap();
        let url = mock_url(&mock_server);
        let res = client.fetch(&url).await;
        assert_eq!(res, Err(ErrorKind::RetriesExhausted(url, 3)));
    }

    #[tokio::test]
    async fn test_backoff_on_rate_limit() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::builder()
            .backoff_base(Duration::from_millis(50))
            .build()
            .client()
            .unwrap();

        let start = Instant::now();
        let body = client.fetch(&mock_url(&mock_server)).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(body, "ok");
        // Two rate-limited attempts: 50ms + 100ms of backoff.
        assert!(elapsed >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_rate_limit_exhausts_full_attempt_budget() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .expect(5)
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::builder()
            .backoff_base(Duration::from_millis(10))
            .build()
            .client()
            .unwrap();

        let start = Instant::now();
        let url = mock_url(&mock_server);
        let res = client.fetch(&url).await;
        let elapsed = start.elapsed();

        assert_eq!(res, Err(ErrorKind::RetriesExhausted(url, 5)));
        // Four backoff pauses between five attempts: 10 + 20 + 40 + 80 ms.
        // No pause after the final attempt.
        assert!(elapsed >= Duration::from_millis(150));
    }

    #[test]
    fn test_invalid_user_agent() {
        let result = ClientBuilder::builder()
            .user_agent("invalid\nagent")
            .build()
            .client();
        assert!(matches!(result, Err(ErrorKind::InvalidHeader(_))));
    }
}
