//! Remote document store over HTTP
//!
//! Speaks the JSON document protocol: every call is a `POST` to the endpoint
//! with the action named in the `X-Amz-Target` header and PascalCase JSON in
//! the body. Items are plain JSON documents.

use super::types::{ItemStore, ItemUpdate, Page, PageFetcher, PageRequest};
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig};
use crate::types::{Item, Operation};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Default target prefix for the JSON protocol
pub const DEFAULT_TARGET_PREFIX: &str = "DynamoDB_20120810";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetItemOutput {
    #[serde(default)]
    item: Option<Item>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AttributesOutput {
    #[serde(default)]
    attributes: Option<Item>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct KeyRequest<'a> {
    table_name: &'a str,
    key: &'a Item,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_values: Option<&'static str>,
}

/// Document store reached over HTTP
#[derive(Debug)]
pub struct HttpStore {
    client: HttpClient,
    endpoint: String,
    target_prefix: String,
}

impl HttpStore {
    /// Create a store for an endpoint using the default client configuration
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_config(endpoint, HttpClientConfig::default())
    }

    /// Create a store for an endpoint with a custom client configuration
    pub fn with_config(endpoint: impl Into<String>, config: HttpClientConfig) -> Result<Self> {
        let endpoint = endpoint.into();
        url::Url::parse(&endpoint)?;
        Ok(Self {
            client: HttpClient::with_config(config)?,
            endpoint,
            target_prefix: DEFAULT_TARGET_PREFIX.to_string(),
        })
    }

    /// Override the `X-Amz-Target` prefix
    #[must_use]
    pub fn with_target_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.target_prefix = prefix.into();
        self
    }

    /// Endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Invoke one protocol action
    async fn call<T: serde::de::DeserializeOwned>(&self, action: &str, body: Value) -> Result<T> {
        let target = format!("{}.{action}", self.target_prefix);
        self.client.post_action(&self.endpoint, &target, &body).await
    }
}

#[async_trait]
impl PageFetcher for HttpStore {
    async fn fetch_page(&self, operation: Operation, request: &PageRequest) -> Result<Page> {
        let body = serde_json::to_value(request)?;
        let page: Page = self.call(operation.action(), body).await?;
        debug!(
            table = %request.table_name,
            %operation,
            count = page.count,
            items = page.len(),
            has_more = page.has_more(),
            "Fetched page"
        );
        Ok(page)
    }
}

#[async_trait]
impl ItemStore for HttpStore {
    async fn get_item(&self, table: &str, key: &Item) -> Result<Option<Item>> {
        let body = serde_json::to_value(KeyRequest {
            table_name: table,
            key,
            return_values: None,
        })?;
        let output: GetItemOutput = self.call("GetItem", body).await?;
        Ok(output.item)
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<()> {
        let body = json!({ "TableName": table, "Item": item });
        let _: Value = self.call("PutItem", body).await?;
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: &Item) -> Result<Option<Item>> {
        let body = serde_json::to_value(KeyRequest {
            table_name: table,
            key,
            return_values: Some("ALL_OLD"),
        })?;
        let output: AttributesOutput = self.call("DeleteItem", body).await?;
        Ok(output.attributes)
    }

    async fn update_item(&self, table: &str, update: &ItemUpdate) -> Result<Option<Item>> {
        let mut body = serde_json::to_value(update)?;
        body["TableName"] = json!(table);
        body["ReturnValues"] = json!("ALL_NEW");
        let output: AttributesOutput = self.call("UpdateItem", body).await?;
        Ok(output.attributes)
    }
}
