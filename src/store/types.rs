//! Store types and traits
//!
//! Defines the page contract every backing store satisfies: a request carrying
//! an optional continuation cursor goes in, a bounded page comes out.

use crate::error::Result;
use crate::types::{Cursor, Item, JsonObject, JsonValue, Operation, Select};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters for a single page request
///
/// Serializes with the store's PascalCase field names so it can be sent as
/// the request body unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PageRequest {
    /// Table to read from
    pub table_name: String,

    /// Secondary index to read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,

    /// Key condition (query only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_condition_expression: Option<String>,

    /// Filter applied after items are read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,

    /// Attributes to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,

    /// Values for `:placeholder` tokens
    #[serde(default, skip_serializing_if = "JsonObject::is_empty")]
    pub expression_attribute_values: JsonObject,

    /// Names for `#placeholder` tokens
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub expression_attribute_names: BTreeMap<String, String>,

    /// Maximum number of items evaluated per page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Which attributes to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Select>,

    /// Continuation cursor from the previous page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_start_key: Option<Cursor>,
}

impl PageRequest {
    /// Create a request against a table
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Read from a secondary index
    #[must_use]
    pub fn index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Set the key condition expression
    #[must_use]
    pub fn key_condition(mut self, expression: impl Into<String>) -> Self {
        self.key_condition_expression = Some(expression.into());
        self
    }

    /// Set the filter expression
    #[must_use]
    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        self.filter_expression = Some(expression.into());
        self
    }

    /// Set the projection expression
    #[must_use]
    pub fn projection(mut self, expression: impl Into<String>) -> Self {
        self.projection_expression = Some(expression.into());
        self
    }

    /// Bind a `:placeholder` value
    #[must_use]
    pub fn value(mut self, placeholder: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.expression_attribute_values
            .insert(placeholder.into(), value.into());
        self
    }

    /// Bind a `#placeholder` attribute name
    #[must_use]
    pub fn name(mut self, placeholder: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.expression_attribute_names
            .insert(placeholder.into(), attribute.into());
        self
    }

    /// Set the page size hint
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the select mode
    #[must_use]
    pub fn select(mut self, select: Select) -> Self {
        self.select = Some(select);
        self
    }

    /// Produce the request for the page that follows `cursor`
    ///
    /// Consumes the request so the cursor is carried forward by value.
    #[must_use]
    pub fn with_start_key(mut self, cursor: Option<Cursor>) -> Self {
        self.exclusive_start_key = cursor;
        self
    }
}

/// One bounded response from the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Page {
    /// Items in store order
    #[serde(default)]
    pub items: Vec<Item>,

    /// Number of matching items (equals `items.len()` unless selecting a count)
    #[serde(default)]
    pub count: u64,

    /// Number of items the store evaluated before filtering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanned_count: Option<u64>,

    /// Cursor for the next page, absent when the sequence is exhausted
    #[serde(
        default,
        rename = "LastEvaluatedKey",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_cursor: Option<Cursor>,
}

impl Page {
    /// Create a page from items, with `count` derived from them
    pub fn new(items: Vec<Item>, next_cursor: Option<Cursor>) -> Self {
        Self {
            count: items.len() as u64,
            items,
            scanned_count: None,
            next_cursor,
        }
    }

    /// Create a count-only page
    pub fn counted(count: u64, next_cursor: Option<Cursor>) -> Self {
        Self {
            items: Vec::new(),
            count,
            scanned_count: None,
            next_cursor,
        }
    }

    /// Number of items physically present in the page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if the store has more pages after this one
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// An in-place update of one item
///
/// Serializes to the store's PascalCase shape minus the table name, which the
/// caller supplies separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemUpdate {
    /// Primary key of the item to update
    pub key: Item,

    /// Update expression, e.g. `SET #s = :s, seen = :t`
    pub update_expression: String,

    /// Values for `:placeholder` tokens
    #[serde(default, skip_serializing_if = "JsonObject::is_empty")]
    pub expression_attribute_values: JsonObject,

    /// Names for `#placeholder` tokens
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub expression_attribute_names: BTreeMap<String, String>,
}

impl ItemUpdate {
    /// Create an update for the item at `key`
    pub fn new(key: Item, update_expression: impl Into<String>) -> Self {
        Self {
            key,
            update_expression: update_expression.into(),
            ..Default::default()
        }
    }

    /// Bind a `:placeholder` value
    #[must_use]
    pub fn value(mut self, placeholder: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.expression_attribute_values
            .insert(placeholder.into(), value.into());
        self
    }

    /// Bind a `#placeholder` attribute name
    #[must_use]
    pub fn name(mut self, placeholder: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.expression_attribute_names
            .insert(placeholder.into(), attribute.into());
        self
    }
}

/// Fetches one page of a query or scan
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page identified by `request.exclusive_start_key`
    async fn fetch_page(&self, operation: Operation, request: &PageRequest) -> Result<Page>;
}

/// Single-item reads and writes
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Fetch one item by its primary key
    async fn get_item(&self, table: &str, key: &Item) -> Result<Option<Item>>;

    /// Insert or replace an item
    async fn put_item(&self, table: &str, item: Item) -> Result<()>;

    /// Remove an item by its primary key, returning the old item if any
    async fn delete_item(&self, table: &str, key: &Item) -> Result<Option<Item>>;

    /// Apply an update expression, returning the item as it is afterwards
    async fn update_item(&self, table: &str, update: &ItemUpdate) -> Result<Option<Item>>;
}

/// A store that supports both paged reads and single-item access
pub trait DocumentStore: PageFetcher + ItemStore {}

impl<T: PageFetcher + ItemStore + ?Sized> DocumentStore for T {}
