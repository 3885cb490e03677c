//! Error types for docstore-pager
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for docstore-pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Validation Errors
    // ============================================================================
    #[error("Invalid range: {message}")]
    InvalidRange { message: String },

    #[error("Invalid operation type: {operation}")]
    InvalidOperation { operation: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Store Errors
    // ============================================================================
    #[error("Store error {code}: {message}")]
    Store { code: String, message: String },

    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    #[error("Page limit ({limit}) exceeded before the window closed")]
    PageLimitExceeded { limit: u64 },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid range error
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::InvalidRange {
            message: message.into(),
        }
    }

    /// Create an invalid operation error
    pub fn invalid_operation(operation: impl Into<String>) -> Self {
        Self::InvalidOperation {
            operation: operation.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a store error from an error code and message
    pub fn store(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a table not found error
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::TableNotFound {
            table: table.into(),
        }
    }

    /// Check if this error is a caller-side validation failure
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidRange { .. }
                | Error::InvalidOperation { .. }
                | Error::InvalidRequest { .. }
        )
    }

    /// Check if the transport should retry the call that produced this error
    ///
    /// Covers throttling and server faults, whether reported as a bare status
    /// or as a store error code, plus timeouts and failed connections.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_connect() || e.is_timeout(),
            Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            Error::Store { code, .. } => is_retryable_store_code(code),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Check if a store error code signals throttling
fn is_retryable_store_code(code: &str) -> bool {
    matches!(
        code,
        "ProvisionedThroughputExceededException"
            | "ThrottlingException"
            | "RequestLimitExceeded"
            | "InternalServerError"
    )
}

/// Result type alias for docstore-pager
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_range("min must be less than max");
        assert_eq!(err.to_string(), "Invalid range: min must be less than max");

        let err = Error::invalid_operation("delete");
        assert_eq!(err.to_string(), "Invalid operation type: delete");

        let err = Error::store("ResourceNotFoundException", "no such table");
        assert_eq!(
            err.to_string(),
            "Store error ResourceNotFoundException: no such table"
        );
    }

    #[test]
    fn test_is_validation() {
        assert!(Error::invalid_range("x").is_validation());
        assert!(Error::invalid_operation("x").is_validation());
        assert!(Error::invalid_request("x").is_validation());

        assert!(!Error::http_status(400, "").is_validation());
        assert!(!Error::PageLimitExceeded { limit: 3 }.is_validation());
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::http_status(429, "").is_retryable());
        assert!(Error::http_status(503, "").is_retryable());
        assert!(Error::store("ProvisionedThroughputExceededException", "slow down").is_retryable());
        assert!(Error::store("ThrottlingException", "").is_retryable());

        assert!(!Error::http_status(400, "").is_retryable());
        assert!(!Error::store("ValidationException", "bad").is_retryable());
        assert!(!Error::invalid_range("test").is_retryable());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
