//! In-memory document store
//!
//! Keeps each table as an insertion-ordered list of items and serves queries
//! and scans in fixed-size pages, the same way a remote store would. Useful
//! for local fixtures and for exercising pagination without a network.

use super::types::{ItemStore, ItemUpdate, Page, PageFetcher, PageRequest};
use crate::error::{Error, Result};
use crate::types::{Cursor, Item, JsonObject, JsonValue, Operation, Select};
use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use tokio::sync::RwLock;
use tracing::trace;

/// Default number of items evaluated per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Matches one `attr = :value` clause
static CLAUSE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(#?[A-Za-z_][A-Za-z0-9_]*)\s*=\s*(:[A-Za-z_][A-Za-z0-9_]*)\s*$").unwrap()
});

/// Splits clauses joined by `AND`
static AND_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+AND\s+").unwrap());

/// Matches a `SET` update expression, capturing its assignments
static SET_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*SET\s+(.+)$").unwrap());

/// A single table
#[derive(Debug, Clone, Default)]
struct MemoryTable {
    key_schema: Vec<String>,
    items: Vec<Item>,
}

impl MemoryTable {
    /// Extract the primary key attributes of an item
    fn key_of(&self, item: &Item) -> Result<Vec<JsonValue>> {
        self.key_schema
            .iter()
            .map(|attr| {
                item.get(attr).cloned().ok_or_else(|| {
                    Error::invalid_request(format!("Missing key attribute '{attr}'"))
                })
            })
            .collect()
    }

    fn position_of(&self, key: &[JsonValue]) -> Option<usize> {
        self.items.iter().position(|item| {
            self.key_schema
                .iter()
                .zip(key)
                .all(|(attr, value)| item.get(attr) == Some(value))
        })
    }
}

/// In-memory store serving paged queries and scans
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, MemoryTable>>,
    page_size: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store with the default page size
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the page size used when a request carries no limit
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Add a table with initial items
    #[must_use]
    pub fn with_table(
        mut self,
        name: impl Into<String>,
        key_schema: &[&str],
        items: impl IntoIterator<Item = Item>,
    ) -> Self {
        let table = MemoryTable {
            key_schema: key_schema.iter().map(|s| (*s).to_string()).collect(),
            items: items.into_iter().collect(),
        };
        self.tables.get_mut().insert(name.into(), table);
        self
    }

    /// Page size used when a request carries no limit
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Create (or reset) a table
    pub async fn create_table(&self, name: impl Into<String>, key_schema: &[&str]) {
        let table = MemoryTable {
            key_schema: key_schema.iter().map(|s| (*s).to_string()).collect(),
            items: Vec::new(),
        };
        self.tables.write().await.insert(name.into(), table);
    }

    /// Number of items in a table
    pub async fn len(&self, table: &str) -> Result<usize> {
        let tables = self.tables.read().await;
        tables
            .get(table)
            .map(|t| t.items.len())
            .ok_or_else(|| Error::table_not_found(table))
    }
}

#[async_trait]
impl PageFetcher for MemoryStore {
    async fn fetch_page(&self, operation: Operation, request: &PageRequest) -> Result<Page> {
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| Error::table_not_found(&request.table_name))?;

        let key_condition = match operation {
            Operation::Query => {
                let expression = request.key_condition_expression.as_deref().ok_or_else(|| {
                    Error::invalid_request("Query requires a key condition expression")
                })?;
                Some(Condition::parse(expression, request)?)
            }
            Operation::Scan => None,
        };
        let filter = request
            .filter_expression
            .as_deref()
            .map(|expression| Condition::parse(expression, request))
            .transpose()?;
        let projection = request
            .projection_expression
            .as_deref()
            .map(|expression| parse_projection(expression, &request.expression_attribute_names))
            .transpose()?;

        let limit = match request.limit {
            Some(0) => return Err(Error::invalid_request("Limit must be greater than 0")),
            Some(limit) => limit as usize,
            None => self.page_size,
        };
        let start = match &request.exclusive_start_key {
            Some(cursor) => decode_cursor(cursor)?,
            None => 0,
        };

        let in_key = |item: &Item| key_condition.as_ref().is_none_or(|c| c.matches(item));

        let mut position = start;
        let mut evaluated = 0usize;
        let mut matched = Vec::new();
        while position < table.items.len() && evaluated < limit {
            let item = &table.items[position];
            position += 1;
            if !in_key(item) {
                continue;
            }
            evaluated += 1;
            if filter.as_ref().is_none_or(|f| f.matches(item)) {
                matched.push(item);
            }
        }

        let has_more = table.items[position.min(table.items.len())..]
            .iter()
            .any(|item| in_key(item));
        let next_cursor = has_more.then(|| encode_cursor(position));

        trace!(
            table = %request.table_name,
            %operation,
            start,
            evaluated,
            matched = matched.len(),
            has_more,
            "Served memory page"
        );

        let mut page = if request.select == Some(Select::Count) {
            Page::counted(matched.len() as u64, next_cursor)
        } else {
            let items = matched
                .into_iter()
                .map(|item| match &projection {
                    Some(attrs) => project(item, attrs),
                    None => item.clone(),
                })
                .collect();
            Page::new(items, next_cursor)
        };
        page.scanned_count = Some(evaluated as u64);
        Ok(page)
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn get_item(&self, table: &str, key: &Item) -> Result<Option<Item>> {
        let tables = self.tables.read().await;
        let table = tables
            .get(table)
            .ok_or_else(|| Error::table_not_found(table))?;
        let key = table.key_of(key)?;
        Ok(table.position_of(&key).map(|i| table.items[i].clone()))
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table)
            .ok_or_else(|| Error::table_not_found(table))?;
        let key = table.key_of(&item)?;
        match table.position_of(&key) {
            Some(i) => table.items[i] = item,
            None => table.items.push(item),
        }
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: &Item) -> Result<Option<Item>> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table)
            .ok_or_else(|| Error::table_not_found(table))?;
        let key = table.key_of(key)?;
        Ok(table.position_of(&key).map(|i| table.items.remove(i)))
    }

    async fn update_item(&self, table: &str, update: &ItemUpdate) -> Result<Option<Item>> {
        let assignments = parse_set(update)?;

        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table)
            .ok_or_else(|| Error::table_not_found(table))?;
        let key = table.key_of(&update.key)?;
        if let Some((attr, _)) = assignments
            .iter()
            .find(|(attr, _)| table.key_schema.contains(attr))
        {
            return Err(Error::invalid_request(format!(
                "Cannot update key attribute '{attr}'"
            )));
        }

        let index = match table.position_of(&key) {
            Some(i) => i,
            None => {
                let item = table
                    .key_schema
                    .iter()
                    .cloned()
                    .zip(key)
                    .collect::<JsonObject>();
                table.items.push(item);
                table.items.len() - 1
            }
        };
        let item = &mut table.items[index];
        item.extend(assignments);
        Ok(Some(item.clone()))
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Conjunction of equality clauses
#[derive(Debug, Clone)]
struct Condition {
    clauses: Vec<(String, JsonValue)>,
}

impl Condition {
    /// Parse `attr = :value [AND attr = :value ...]`
    fn parse(expression: &str, request: &PageRequest) -> Result<Self> {
        let clauses = AND_REGEX
            .split(expression.trim())
            .map(|clause| {
                bind_clause(
                    clause,
                    &request.expression_attribute_values,
                    &request.expression_attribute_names,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { clauses })
    }

    fn matches(&self, item: &Item) -> bool {
        self.clauses
            .iter()
            .all(|(attr, value)| item.get(attr) == Some(value))
    }
}

/// Parse `SET attr = :value [, attr = :value ...]` into assignments
fn parse_set(update: &ItemUpdate) -> Result<Vec<(String, JsonValue)>> {
    let expression = &update.update_expression;
    let caps = SET_REGEX.captures(expression).ok_or_else(|| {
        Error::invalid_request(format!("Unsupported update expression: '{expression}'"))
    })?;
    caps[1]
        .split(',')
        .map(|clause| {
            bind_clause(
                clause,
                &update.expression_attribute_values,
                &update.expression_attribute_names,
            )
        })
        .collect()
}

/// Resolve one `attr = :value` clause against its placeholders
fn bind_clause(
    clause: &str,
    values: &JsonObject,
    names: &BTreeMap<String, String>,
) -> Result<(String, JsonValue)> {
    let caps = CLAUSE_REGEX
        .captures(clause)
        .ok_or_else(|| Error::invalid_request(format!("Unsupported expression: '{clause}'")))?;
    let attr = resolve_name(&caps[1], names)?;
    let value = values.get(&caps[2]).cloned().ok_or_else(|| {
        Error::invalid_request(format!("Unbound value placeholder '{}'", &caps[2]))
    })?;
    Ok((attr, value))
}

/// Resolve a possibly `#`-prefixed attribute name
fn resolve_name(token: &str, names: &BTreeMap<String, String>) -> Result<String> {
    if token.starts_with('#') {
        names
            .get(token)
            .cloned()
            .ok_or_else(|| Error::invalid_request(format!("Unbound name placeholder '{token}'")))
    } else {
        Ok(token.to_string())
    }
}

fn parse_projection(expression: &str, names: &BTreeMap<String, String>) -> Result<Vec<String>> {
    expression
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|token| resolve_name(token, names))
        .collect()
}

fn project(item: &Item, attrs: &[String]) -> Item {
    attrs
        .iter()
        .filter_map(|attr| item.get(attr).map(|v| (attr.clone(), v.clone())))
        .collect::<JsonObject>()
}

// ============================================================================
// Cursors
// ============================================================================

fn encode_cursor(position: usize) -> Cursor {
    Cursor::new(json!({ "position": position }))
}

fn decode_cursor(cursor: &Cursor) -> Result<usize> {
    cursor
        .as_value()
        .get("position")
        .and_then(JsonValue::as_u64)
        .map(|p| p as usize)
        .ok_or_else(|| Error::invalid_request("Malformed exclusive start key"))
}
