//! Offset-windowed pagination
//!
//! Walks the pages of a query or scan, keeping a running offset of how many
//! items earlier pages held, and collects exactly the items whose position in
//! the concatenated sequence falls inside a [`Range`].

use super::types::{PageAction, Range, WindowConfig, WindowedItems};
use crate::error::{Error, Result};
use crate::store::{Page, PageFetcher, PageRequest};
use crate::types::{Operation, Select};
use tracing::{debug, trace};

/// Decide what to do with the page covering positions `[count, next)`
///
/// `count` is the number of items in all earlier pages and `next` is `count`
/// plus this page's length, so `count < next` always holds. Returned slices
/// are local to the page.
pub fn classify(count: u64, next: u64, range: &Range) -> PageAction {
    debug_assert!(count < next, "classify called with an empty page");
    let (min, max) = (range.min(), range.max());

    // Page starts at or past the window end
    if count >= max {
        return PageAction::stop();
    }
    // Page ends at or before the window start
    if next <= min {
        return PageAction::skip();
    }

    let start = (min.max(count) - count) as usize;
    let end = (max.min(next) - count) as usize;
    if next >= max {
        PageAction::take_last(start..end)
    } else {
        PageAction::take(start..end)
    }
}

/// Drives page fetches until a window is filled or the store runs dry
#[derive(Debug)]
pub struct RangeWindower<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    config: WindowConfig,
}

impl<'a, F: PageFetcher + ?Sized> RangeWindower<'a, F> {
    /// Create a windower with no page limit
    pub fn new(fetcher: &'a F) -> Self {
        Self {
            fetcher,
            config: WindowConfig::default(),
        }
    }

    /// Set the window configuration
    #[must_use]
    pub fn with_config(mut self, config: WindowConfig) -> Self {
        self.config = config;
        self
    }

    /// Fetch the items at positions `[range.min, range.max)`
    ///
    /// Returns fewer items than the range spans when the store is exhausted
    /// first. Errors from the fetcher are returned unchanged and discard
    /// anything collected so far. A count-only request is rejected before
    /// any page is fetched.
    pub async fn fetch(
        &self,
        operation: Operation,
        range: Range,
        request: PageRequest,
    ) -> Result<WindowedItems> {
        if request.select == Some(Select::Count) {
            return Err(Error::invalid_request(
                "Windowed reads need items; Select COUNT is not supported",
            ));
        }

        let mut request = request;
        let mut count = 0u64;
        let mut items = Vec::new();
        let mut pages_fetched = 0u64;

        loop {
            if let Some(limit) = self.config.max_pages {
                if pages_fetched >= limit {
                    return Err(Error::PageLimitExceeded { limit });
                }
            }

            let Page {
                items: page_items,
                next_cursor,
                ..
            } = self.fetcher.fetch_page(operation, &request).await?;
            pages_fetched += 1;

            let mut stop = false;
            if page_items.is_empty() {
                trace!(page = pages_fetched, offset = count, "Empty page");
            } else {
                let next = count + page_items.len() as u64;
                let action = classify(count, next, &range);
                debug!(
                    page = pages_fetched,
                    offset = count,
                    len = page_items.len(),
                    slice = ?action.slice,
                    stop = action.stop,
                    "Windowed page"
                );

                if let Some(slice) = action.slice {
                    items.extend(page_items.into_iter().skip(slice.start).take(slice.len()));
                }
                count = next;
                stop = action.stop;
            }

            match next_cursor {
                Some(cursor) if !stop => request = request.with_start_key(Some(cursor)),
                last_evaluated_key => {
                    debug!(
                        %operation,
                        min = range.min(),
                        max = range.max(),
                        returned = items.len(),
                        pages = pages_fetched,
                        "Window complete"
                    );
                    return Ok(WindowedItems {
                        count: items.len() as u64,
                        items,
                        last_evaluated_key,
                        pages_fetched,
                    });
                }
            }
        }
    }
}

/// Fetch a window with default settings
pub async fn windowed_fetch<F: PageFetcher + ?Sized>(
    fetcher: &F,
    operation: Operation,
    range: Range,
    request: PageRequest,
) -> Result<WindowedItems> {
    RangeWindower::new(fetcher)
        .fetch(operation, range, request)
        .await
}
