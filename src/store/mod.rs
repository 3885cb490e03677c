//! Store module
//!
//! The page-fetch seam between the pagination core and a concrete backend.
//!
//! # Overview
//!
//! - `PageFetcher` - fetch one page of a query or scan
//! - `ItemStore` - single-item get, put, update and delete
//! - `MemoryStore` - in-process backend with fixed-size pages
//! - `HttpStore` - JSON document protocol over HTTP

mod memory;
mod remote;
mod types;

pub use memory::{MemoryStore, DEFAULT_PAGE_SIZE};
pub use remote::{HttpStore, DEFAULT_TARGET_PREFIX};
pub use types::{DocumentStore, ItemStore, ItemUpdate, Page, PageFetcher, PageRequest};
