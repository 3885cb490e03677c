//! HTTP transport module
//!
//! Carries store protocol calls for the remote store.
//!
//! # Features
//!
//! - **Action Calls**: JSON `POST` with the action in `X-Amz-Target`
//! - **Error Classification**: protocol error bodies become store errors
//! - **Automatic Retries**: throttling and server faults retried with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod rate_limit;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, RetryPolicy, CONTENT_TYPE,
    TARGET_HEADER,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
