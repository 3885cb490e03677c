//! Store service
//!
//! Caller-facing entry point bundling single-page reads, exhaustive reads,
//! counts, windowed reads and single-item access over one document store.

use crate::error::{Error, Result};
use crate::pagination::{
    count_all, fetch_all, Range, RangeWindower, RawRange, WindowConfig, WindowedItems,
};
use crate::store::{DocumentStore, ItemUpdate, Page, PageRequest};
use crate::types::{Item, Operation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A windowed read as supplied by a caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeRequest {
    /// Window bounds, validated before any page is fetched
    #[serde(default)]
    pub range: RawRange,
    /// Parameters for every page request
    pub request_params: PageRequest,
}

impl RangeRequest {
    /// Create a range request
    pub fn new(range: RawRange, request_params: PageRequest) -> Self {
        Self {
            range,
            request_params,
        }
    }
}

/// Service over a document store
pub struct StoreService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
    window: WindowConfig,
}

impl<S: DocumentStore + ?Sized> Clone for StoreService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            window: self.window,
        }
    }
}

impl<S: DocumentStore + ?Sized> std::fmt::Debug for StoreService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreService")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl<S: DocumentStore + ?Sized> StoreService<S> {
    /// Create a service over a shared store
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            window: WindowConfig::default(),
        }
    }

    /// Set the configuration used for windowed reads
    #[must_use]
    pub fn with_window_config(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    // ------------------------------------------------------------------------
    // Single pages
    // ------------------------------------------------------------------------

    /// Fetch one page of a query
    pub async fn query(&self, request: &PageRequest) -> Result<Page> {
        self.store.fetch_page(Operation::Query, request).await
    }

    /// Fetch one page of a scan
    pub async fn scan(&self, request: &PageRequest) -> Result<Page> {
        self.store.fetch_page(Operation::Scan, request).await
    }

    // ------------------------------------------------------------------------
    // Exhaustive reads
    // ------------------------------------------------------------------------

    /// Every item a query matches
    pub async fn query_all(&self, request: PageRequest) -> Result<Vec<Item>> {
        fetch_all(self.store.as_ref(), Operation::Query, request).await
    }

    /// Every item a scan visits
    pub async fn scan_all(&self, request: PageRequest) -> Result<Vec<Item>> {
        fetch_all(self.store.as_ref(), Operation::Scan, request).await
    }

    /// Number of items a query matches
    pub async fn query_count(&self, request: PageRequest) -> Result<u64> {
        count_all(self.store.as_ref(), Operation::Query, request).await
    }

    /// Number of items a scan visits
    pub async fn scan_count(&self, request: PageRequest) -> Result<u64> {
        count_all(self.store.as_ref(), Operation::Scan, request).await
    }

    // ------------------------------------------------------------------------
    // Windowed reads
    // ------------------------------------------------------------------------

    /// Items at positions `[min, max)` of a query
    pub async fn query_range(&self, request: RangeRequest) -> Result<WindowedItems> {
        self.window_with(Operation::Query, request).await
    }

    /// Items at positions `[min, max)` of a scan
    pub async fn scan_range(&self, request: RangeRequest) -> Result<WindowedItems> {
        self.window_with(Operation::Scan, request).await
    }

    /// Windowed read with the operation named at runtime (`"query"` or `"scan"`)
    ///
    /// Range and operation are validated before anything is fetched.
    pub async fn operate_with_range(
        &self,
        operation: &str,
        request: RangeRequest,
    ) -> Result<WindowedItems> {
        let range = Range::try_from(request.range)?;
        let operation: Operation = operation.parse()?;
        self.windowed(operation, range, request.request_params).await
    }

    async fn window_with(
        &self,
        operation: Operation,
        request: RangeRequest,
    ) -> Result<WindowedItems> {
        let range = Range::try_from(request.range)?;
        self.windowed(operation, range, request.request_params).await
    }

    /// Windowed read with an already validated range
    ///
    /// Count-only requests are rejected, since a window needs the items.
    pub async fn windowed(
        &self,
        operation: Operation,
        range: Range,
        request: PageRequest,
    ) -> Result<WindowedItems> {
        debug!(
            %operation,
            table = %request.table_name,
            min = range.min(),
            max = range.max(),
            "Starting windowed read"
        );
        RangeWindower::new(self.store.as_ref())
            .with_config(self.window)
            .fetch(operation, range, request)
            .await
    }

    // ------------------------------------------------------------------------
    // Single items
    // ------------------------------------------------------------------------

    /// Fetch one item by key
    pub async fn get_item(&self, table: &str, key: &Item) -> Result<Option<Item>> {
        check_table(table)?;
        self.store.get_item(table, key).await
    }

    /// Insert or replace one item
    pub async fn put_item(&self, table: &str, item: Item) -> Result<()> {
        check_table(table)?;
        self.store.put_item(table, item).await
    }

    /// Apply an update expression, returning the item as it is afterwards
    pub async fn update_item(&self, table: &str, update: &ItemUpdate) -> Result<Option<Item>> {
        check_table(table)?;
        debug!(table, expression = %update.update_expression, "Updating item");
        self.store.update_item(table, update).await
    }

    /// Remove one item by key, returning the previous item if any
    pub async fn delete_item(&self, table: &str, key: &Item) -> Result<Option<Item>> {
        check_table(table)?;
        self.store.delete_item(table, key).await
    }
}

fn check_table(table: &str) -> Result<()> {
    if table.is_empty() {
        return Err(Error::invalid_request("Table name must not be empty"));
    }
    Ok(())
}
