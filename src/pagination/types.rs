//! Pagination types
//!
//! Window bounds, per-page decisions, and the assembled output.

use crate::error::{Error, Result};
use crate::types::{Cursor, Item};
use serde::{Deserialize, Serialize};

/// Half-open window `[min, max)` over the virtual item sequence
///
/// Always satisfies `min < max`; construct through [`Range::new`] or one of
/// the fallible conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange", into = "RawRange")]
pub struct Range {
    min: u64,
    max: u64,
}

impl Range {
    /// Create a validated range
    pub fn new(min: u64, max: u64) -> Result<Self> {
        if min >= max {
            return Err(Error::invalid_range("min must be less than max."));
        }
        Ok(Self { min, max })
    }

    /// Create a range from possibly missing bounds
    pub fn from_bounds(min: Option<u64>, max: Option<u64>) -> Result<Self> {
        match (min, max) {
            (Some(min), Some(max)) => Self::new(min, max),
            _ => Err(Error::invalid_range(
                "range must have min and max properties.",
            )),
        }
    }

    /// First position in the window
    pub fn min(&self) -> u64 {
        self.min
    }

    /// First position past the window
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Number of positions the window spans
    pub fn len(&self) -> u64 {
        self.max - self.min
    }

    /// Always false; a valid range is never empty
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check whether a position falls inside the window
    pub fn contains(&self, position: u64) -> bool {
        self.min <= position && position < self.max
    }
}

impl TryFrom<std::ops::Range<u64>> for Range {
    type Error = Error;

    fn try_from(range: std::ops::Range<u64>) -> Result<Self> {
        Self::new(range.start, range.end)
    }
}

impl TryFrom<RawRange> for Range {
    type Error = Error;

    fn try_from(raw: RawRange) -> Result<Self> {
        Self::from_bounds(raw.min, raw.max)
    }
}

/// Unvalidated range as supplied by a caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRange {
    /// First position in the window
    #[serde(default)]
    pub min: Option<u64>,
    /// First position past the window
    #[serde(default)]
    pub max: Option<u64>,
}

impl RawRange {
    /// Create a raw range with both bounds present
    pub fn new(min: u64, max: u64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

impl From<Range> for RawRange {
    fn from(range: Range) -> Self {
        Self::new(range.min, range.max)
    }
}

/// What to do with one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAction {
    /// Page-local slice to append, if any
    pub slice: Option<std::ops::Range<usize>>,
    /// Whether the window is closed after this page
    pub stop: bool,
}

impl PageAction {
    /// Append nothing and keep going
    pub fn skip() -> Self {
        Self {
            slice: None,
            stop: false,
        }
    }

    /// Append nothing and stop
    pub fn stop() -> Self {
        Self {
            slice: None,
            stop: true,
        }
    }

    /// Append a slice and keep going
    pub fn take(slice: std::ops::Range<usize>) -> Self {
        Self {
            slice: Some(slice),
            stop: false,
        }
    }

    /// Append a slice and stop
    pub fn take_last(slice: std::ops::Range<usize>) -> Self {
        Self {
            slice: Some(slice),
            stop: true,
        }
    }
}

/// Settings for a windowed fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Maximum number of pages to fetch before giving up (unbounded if unset)
    #[serde(default)]
    pub max_pages: Option<u64>,
}

impl WindowConfig {
    /// Create an unbounded config
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of page fetches
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u64) -> Self {
        self.max_pages = Some(max_pages);
        self
    }
}

/// Items returned by a windowed fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WindowedItems {
    /// Items in window order
    pub items: Vec<Item>,

    /// Number of items returned
    pub count: u64,

    /// Cursor after the last page consumed; absent once the store is exhausted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_evaluated_key: Option<Cursor>,

    /// Number of pages fetched to assemble the window
    #[serde(default)]
    pub pages_fetched: u64,
}

impl WindowedItems {
    /// Number of items returned
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the window was empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
