// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # docstore-pager
//!
//! Offset-windowed pagination over cursor-paged document stores.
//!
//! A store answers queries and scans in bounded pages linked by opaque
//! continuation cursors. This crate turns that into:
//!
//! - **Windowed reads**: the items at logical positions `[min, max)` of the
//!   concatenated page sequence, fetching no more pages than needed
//! - **Exhaustive reads and counts**: follow cursors until the store runs dry
//! - **Single-item access**: get, put, update and delete by primary key
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docstore_pager::{HttpStore, PageRequest, RangeRequest, RawRange, StoreService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> docstore_pager::Result<()> {
//!     let store = HttpStore::new("http://localhost:8000")?;
//!     let service = StoreService::new(Arc::new(store));
//!
//!     let request = PageRequest::new("events")
//!         .key_condition("pk = :pk")
//!         .value(":pk", "user#1");
//!     let window = service
//!         .query_range(RangeRequest::new(RawRange::new(20, 30), request))
//!         .await?;
//!
//!     println!("{} items", window.count);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      StoreService                        │
//! │  query/scan  *_all  *_count  *_range  get/put/update/del │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//! ┌────────────────────────────┴─────────────────────────────┐
//! │                       Pagination                         │
//! │  RangeWindower + classify        pages / fetch_all       │
//! └──────────────────────────────────────────────────────────┘
//!                              │  PageFetcher / ItemStore
//! ┌──────────────────────────────┬───────────────────────────┐
//! │         MemoryStore          │   HttpStore (HttpClient)  │
//! │  fixtures, tests             │   retry, rate limit       │
//! └──────────────────────────────┴───────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retry and rate limiting
pub mod http;

/// Store access traits and implementations
pub mod store;

/// Windowed and exhaustive pagination
pub mod pagination;

/// Caller-facing service
pub mod service;

/// Configuration loading
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::StoreConfig;
pub use pagination::{
    classify, count_all, fetch_all, pages, windowed_fetch, Range, RangeWindower, RawRange,
    WindowConfig, WindowedItems,
};
pub use service::{RangeRequest, StoreService};
pub use store::{
    DocumentStore, HttpStore, ItemStore, ItemUpdate, MemoryStore, Page, PageFetcher, PageRequest,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
