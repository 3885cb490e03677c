//! Exhaustive pagination
//!
//! Follows continuation cursors to the end of a query or scan. A page that
//! reports a zero count also ends the walk.

use crate::error::{Error, Result};
use crate::store::{Page, PageFetcher, PageRequest};
use crate::types::{Item, Operation, Select};
use futures::stream::{self, Stream, TryStreamExt};
use tracing::debug;

/// Stream every page of a query or scan, in order
pub fn pages<'a, F: PageFetcher + ?Sized>(
    fetcher: &'a F,
    operation: Operation,
    request: PageRequest,
) -> impl Stream<Item = Result<Page>> + Send + 'a {
    stream::try_unfold(Some(request), move |state| async move {
        let Some(request) = state else {
            return Ok::<_, Error>(None);
        };

        let page = fetcher.fetch_page(operation, &request).await?;
        if page.count == 0 {
            debug!(%operation, table = %request.table_name, "Zero-count page, stopping");
            return Ok(None);
        }

        let next = page
            .next_cursor
            .clone()
            .map(|cursor| request.with_start_key(Some(cursor)));
        Ok(Some((page, next)))
    })
}

/// Collect every item of a query or scan
pub async fn fetch_all<F: PageFetcher + ?Sized>(
    fetcher: &F,
    operation: Operation,
    request: PageRequest,
) -> Result<Vec<Item>> {
    pages(fetcher, operation, request)
        .try_fold(Vec::new(), |mut items, page| async move {
            items.extend(page.items);
            Ok(items)
        })
        .await
}

/// Count every item of a query or scan without transferring the items
pub async fn count_all<F: PageFetcher + ?Sized>(
    fetcher: &F,
    operation: Operation,
    request: PageRequest,
) -> Result<u64> {
    let request = request.select(Select::Count);
    pages(fetcher, operation, request)
        .try_fold(0u64, |total, page| async move { Ok(total + page.count) })
        .await
}
