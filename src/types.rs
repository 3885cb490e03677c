//! Common types used throughout docstore-pager
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single stored document
pub type Item = JsonObject;

// ============================================================================
// Cursor
// ============================================================================

/// Opaque continuation token returned by the store
///
/// Wraps whatever the store hands back as its "last evaluated key". Callers
/// should treat it as a black box and only pass it back on the next request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(JsonValue);

impl Cursor {
    /// Wrap a raw store key
    pub fn new(value: impl Into<JsonValue>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw store key
    pub fn as_value(&self) -> &JsonValue {
        &self.0
    }

    /// Unwrap into the raw store key
    pub fn into_value(self) -> JsonValue {
        self.0
    }
}

impl From<JsonValue> for Cursor {
    fn from(value: JsonValue) -> Self {
        Self(value)
    }
}

// ============================================================================
// Operation
// ============================================================================

/// Store access pattern used to produce pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Key-condition restricted access
    Query,
    /// Full table walk
    Scan,
}

impl Operation {
    /// Action name used on the wire (e.g. `Query`)
    pub fn action(&self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Scan => "Scan",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => f.write_str("query"),
            Self::Scan => f.write_str("scan"),
        }
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("query") {
            Ok(Self::Query)
        } else if s.eq_ignore_ascii_case("scan") {
            Ok(Self::Scan)
        } else {
            Err(Error::invalid_operation(s))
        }
    }
}

// ============================================================================
// Select
// ============================================================================

/// Which attributes the store should return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Select {
    /// Every attribute of each item
    #[default]
    AllAttributes,
    /// Only attributes projected into the index
    AllProjectedAttributes,
    /// Only the attributes named in the projection
    SpecificAttributes,
    /// No items, just the number of matches
    Count,
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Log Level
// ============================================================================

/// Log level for the command-line front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Per-page detail from the stores
    Trace,
    /// Per-request detail, as with `--verbose`
    Debug,
    /// Store selection and command summaries
    Info,
    /// Retried calls and other recoverable problems
    Warn,
    /// Failures only
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}
