//! Pagination module
//!
//! Windowed and exhaustive traversal of cursor-paginated stores.
//!
//! # Overview
//!
//! A store hands results back in bounded pages linked by opaque cursors. This
//! module turns that into two higher-level reads:
//! - `RangeWindower` - the items at positions `[min, max)` of the
//!   concatenated page sequence, fetching no more pages than needed
//! - `fetch_all` / `count_all` / `pages` - everything, until the store runs dry

mod exhaustive;
mod types;
mod window;

pub use exhaustive::{count_all, fetch_all, pages};
pub use types::{PageAction, Range, RawRange, WindowConfig, WindowedItems};
pub use window::{classify, windowed_fetch, RangeWindower};
