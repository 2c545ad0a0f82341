
use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;
const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

/// Blocking JSON-over-HTTP transport with retry and exponential backoff.
///
/// Server errors (5xx), rate limiting (429) and transport failures are
/// retried; any other client error fails immediately.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
    retry_attempts: u32,
    backoff_base_ms: u64,
}

impl Default for HttpTransport {
    #[inline]
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
    }
}

impl HttpTransport {
    #[inline]
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            agent,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        }
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    /// Delay before the first retry; doubles on every further attempt
    #[inline]
    pub fn with_backoff_base(mut self, delay: Duration) -> Self {
        self.backoff_base_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[inline]
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    #[inline]
    pub fn get(&self, url: &Url, headers: &[(&str, String)]) -> Result<String> {
        self.make_request_with_retry(url, || {
            let mut request = self.agent.get(url.as_str());
            for (name, value) in headers {
                request = request.header(*name, value.as_str());
            }
            request
                .call()
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
    }

    #[inline]
    pub fn post_json<T: Serialize>(
        &self,
        url: &Url,
        headers: &[(&str, String)],
        body: &T,
    ) -> Result<String> {
        let request_json = serde_json::to_string(body).context("Failed to serialize request")?;

        self.make_request_with_retry(url, || {
            let mut request = self
                .agent
                .post(url.as_str())
                .header("Content-Type", "application/json");
            for (name, value) in headers {
                request = request.header(*name, value.as_str());
            }
            request
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
    }

    fn make_request_with_retry<F>(&self, url: &Url, mut request_fn: F) -> Result<String>
    where
        F: FnMut() -> Result<String, ureq::Error>,
    {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            debug!(
                "HTTP request to {} attempt {}/{}",
                url.path(),
                attempt,
                self.retry_attempts
            );

            match request_fn() {
                Ok(response_text) => {
                    debug!("Request succeeded on attempt {}", attempt);
                    return Ok(response_text);
                }
                Err(error) => {
                    let should_retry = match &error {
                        ureq::Error::StatusCode(status) => {
                            if *status >= 500 || *status == 429 {
                                warn!(
                                    "Retryable status {}, attempt {}/{}",
                                    status, attempt, self.retry_attempts
                                );
                                true
                            } else if *status == 401 || *status == 403 {
                                warn!("Provider rejected credentials (status {})", status);
                                return Err(anyhow::anyhow!(
                                    "Authentication rejected: HTTP {}",
                                    status
                                ));
                            } else {
                                warn!("Client error (status {}), not retrying", status);
                                return Err(anyhow::anyhow!("Client error: HTTP {}", status));
                            }
                        }
                        ureq::Error::ConnectionFailed
                        | ureq::Error::HostNotFound
                        | ureq::Error::Timeout(_)
                        | ureq::Error::Io(_) => {
                            warn!(
                                "Transport error: {}, attempt {}/{}",
                                error, attempt, self.retry_attempts
                            );
                            true
                        }
                        _ => {
                            warn!("Non-retryable error: {}", error);
                            false
                        }
                    };

                    if !should_retry {
                        return Err(anyhow::anyhow!("Non-retryable error: {}", error));
                    }

                    last_error = Some(anyhow::anyhow!("Request error: {}", error));

                    if attempt < self.retry_attempts {
                        let delay_ms = EXPONENTIAL_BACKOFF_BASE
                            .saturating_pow(attempt - 1)
                            .saturating_mul(self.backoff_base_ms);
                        let delay = Duration::from_millis(delay_ms);
                        debug!("Waiting {:?} before retry", delay);
                        std::thread::sleep(delay);
                    }
                }
            }
        }

        error!(
            "All retry attempts failed for request to {}",
            url.host_str().unwrap_or("unknown host")
        );

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Request failed after retries")))
    }
}

/// Run a blocking provider call on tokio's blocking pool
#[inline]
pub async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("Blocking provider task panicked or was cancelled")?
}
