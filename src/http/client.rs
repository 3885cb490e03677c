//! Store protocol transport
//!
//! Every call is a JSON `POST` that names its action in the `X-Amz-Target`
//! header. Failed calls are classified into store errors from the protocol's
//! `{"__type", "message"}` body, and throttling or server faults are retried
//! with backoff.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use crate::types::BackoffType;
use reqwest::header::{CONTENT_TYPE as CONTENT_TYPE_HEADER, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Content type required by the JSON protocol
pub const CONTENT_TYPE: &str = "application/x-amz-json-1.0";

/// Header naming the protocol action
pub const TARGET_HEADER: &str = "X-Amz-Target";

const USER_AGENT: &str = concat!("docstore-pager/", env!("CARGO_PKG_VERSION"));

/// When and how long to wait before retrying a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// How the delay grows between retries
    pub backoff: BackoffType,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Ceiling on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: BackoffType::Exponential,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt + 1`
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            BackoffType::Constant => self.initial_delay,
            BackoffType::Linear => self.initial_delay.saturating_mul(attempt + 1),
            BackoffType::Exponential => self
                .initial_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.max_delay)
    }

    /// Whether `err`, seen on attempt `attempt`, earns another try
    fn allows(&self, attempt: u32, err: &Error) -> bool {
        attempt < self.max_retries && err.is_retryable()
    }
}

/// Transport settings
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-call timeout
    pub timeout: Duration,
    /// Retry behaviour
    pub retry: RetryPolicy,
    /// Client-side rate limit, shared by every call of one client
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            rate_limit: Some(RateLimiterConfig::default()),
        }
    }
}

impl HttpClientConfig {
    /// Start from the defaults
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder(Self::default())
    }
}

/// Builder for [`HttpClientConfig`]
pub struct HttpClientConfigBuilder(HttpClientConfig);

impl HttpClientConfigBuilder {
    /// Per-call timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.0.timeout = timeout;
        self
    }

    /// Retries after the first attempt
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.0.retry.max_retries = retries;
        self
    }

    /// Backoff shape, first delay and ceiling
    #[must_use]
    pub fn backoff(mut self, backoff: BackoffType, initial: Duration, max: Duration) -> Self {
        self.0.retry.backoff = backoff;
        self.0.retry.initial_delay = initial;
        self.0.retry.max_delay = max;
        self
    }

    /// Throttle calls client-side
    #[must_use]
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.0.rate_limit = Some(config);
        self
    }

    /// Send calls as fast as the store answers
    #[must_use]
    pub fn no_rate_limit(mut self) -> Self {
        self.0.rate_limit = None;
        self
    }

    /// Finish
    pub fn build(self) -> HttpClientConfig {
        self.0
    }
}

/// Protocol error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(alias = "Message", default)]
    message: String,
}

/// Transport for store protocol calls
pub struct HttpClient {
    inner: Client,
    timeout: Duration,
    retry: RetryPolicy,
    limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a client
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let inner = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner,
            timeout: config.timeout,
            retry: config.retry,
            limiter: config.rate_limit.as_ref().map(RateLimiter::new),
        })
    }

    /// Retry behaviour of this client
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Invoke one protocol action and decode its response
    ///
    /// Retryable failures (see [`Error::is_retryable`]) are retried up to
    /// `max_retries` times; the last failure is returned once they run out.
    pub async fn post_action<T: DeserializeOwned>(
        &self,
        url: &str,
        target: &str,
        body: &Value,
    ) -> Result<T> {
        let payload = serde_json::to_vec(body)?;
        let mut attempt = 0;

        loop {
            if let Some(limiter) = &self.limiter {
                limiter.wait().await;
            }

            let err = match self.send(url, target, payload.clone()).await {
                Ok(response) => return response.json().await.map_err(Error::Http),
                Err(err) => err,
            };
            if !self.retry.allows(attempt, &err) {
                return Err(err);
            }

            let delay = match &err {
                Error::RateLimited {
                    retry_after_seconds,
                } => Duration::from_secs(*retry_after_seconds),
                _ => self.retry.delay(attempt),
            };
            attempt += 1;
            warn!(
                action = target,
                attempt,
                of = self.retry.max_retries,
                ?delay,
                error = %err,
                "Store call failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// One attempt; non-success statuses come back classified
    async fn send(&self, url: &str, target: &str, payload: Vec<u8>) -> Result<Response> {
        let response = self
            .inner
            .post(url)
            .header(TARGET_HEADER, target)
            .header(CONTENT_TYPE_HEADER, CONTENT_TYPE)
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    Error::Http(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(action = target, status = status.as_u16(), "Store call succeeded");
            Ok(response)
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Err(Error::RateLimited {
                retry_after_seconds: retry_after(&response),
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_failure(status.as_u16(), body))
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("rate_limited", &self.limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Turn a failed response into an error
///
/// A `__type` such as `com.amazonaws.dynamodb.v20120810#ResourceNotFoundException`
/// becomes a store error with the part after `#` as its code. Anything else
/// stays an HTTP status error.
fn classify_failure(status: u16, body: String) -> Error {
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) if !parsed.kind.is_empty() => {
            let code = parsed
                .kind
                .rsplit_once('#')
                .map_or(parsed.kind.as_str(), |(_, code)| code);
            Error::store(code, parsed.message)
        }
        _ => Error::HttpStatus { status, body },
    }
}

/// Seconds from the `Retry-After` header, 1 when absent or not a number
fn retry_after(response: &Response) -> u64 {
    let header = response.headers().get(RETRY_AFTER);
    header
        .and_then(|value| value.to_str().ok()?.trim().parse().ok())
        .unwrap_or(1)
}
