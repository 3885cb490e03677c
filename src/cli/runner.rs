//! CLI runner - executes commands

use crate::cli::commands::{parse_names, parse_values, Cli, Commands, OutputFormat};
use crate::config::StoreConfig;
use crate::error::{Error, Result, ResultExt};
use crate::pagination::RawRange;
use crate::service::{RangeRequest, StoreService};
use crate::store::{DocumentStore, HttpStore, ItemUpdate, MemoryStore};
use crate::types::{Item, Operation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Tables to load into the in-memory store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    /// Tables by name
    #[serde(default)]
    pub tables: BTreeMap<String, FixtureTable>,
}

/// One fixture table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureTable {
    /// Primary key attribute names
    pub key_schema: Vec<String>,
    /// Items in store order
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Fixture {
    /// Read a fixture file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid fixture JSON in {}", path.display()))
    }

    /// Build an in-memory store holding the fixture's tables
    pub fn into_store(self, page_size: usize) -> MemoryStore {
        self.tables
            .into_iter()
            .fold(MemoryStore::new().with_page_size(page_size), |store, (name, table)| {
                let keys: Vec<&str> = table.key_schema.iter().map(String::as_str).collect();
                store.with_table(name, &keys, table.items)
            })
    }
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Log level for this invocation
    ///
    /// `--verbose` wins, then the config file, then INFO.
    pub fn log_level(&self) -> tracing::Level {
        if self.cli.verbose {
            return tracing::Level::DEBUG;
        }
        self.load_config()
            .ok()
            .and_then(|config| config.log_level)
            .map_or(tracing::Level::INFO, Into::into)
    }

    /// Run the CLI command and print its output
    pub async fn run(&self) -> Result<()> {
        let output = self.execute().await?;
        self.output_message(&output);
        Ok(())
    }

    /// Run the CLI command and return its output
    pub async fn execute(&self) -> Result<Value> {
        let config = self.load_config()?;
        let store = self.build_store(&config)?;
        let service = StoreService::new(store).with_window_config(config.window);
        let start = Instant::now();

        let output = match &self.cli.command {
            Commands::Range {
                operation,
                min,
                max,
                request,
            } => {
                let request = RangeRequest::new(
                    RawRange {
                        min: *min,
                        max: *max,
                    },
                    request.to_request()?,
                );
                let result = service.operate_with_range(operation, request).await?;
                info!(
                    count = result.count,
                    pages = result.pages_fetched,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Range read complete"
                );
                serde_json::to_value(result)?
            }
            Commands::All { operation, request } => {
                let operation: Operation = operation.parse()?;
                let request = request.to_request()?;
                let items = match operation {
                    Operation::Query => service.query_all(request).await?,
                    Operation::Scan => service.scan_all(request).await?,
                };
                info!(
                    count = items.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Read complete"
                );
                json!({ "Items": items, "Count": items.len() })
            }
            Commands::Count { operation, request } => {
                let operation: Operation = operation.parse()?;
                let request = request.to_request()?;
                let count = match operation {
                    Operation::Query => service.query_count(request).await?,
                    Operation::Scan => service.scan_count(request).await?,
                };
                json!({ "Count": count })
            }
            Commands::Get { table, key } => {
                let key: Item = serde_json::from_str(key)
                    .map_err(|e| Error::invalid_request(format!("Invalid --key JSON: {e}")))?;
                let item = service.get_item(table, &key).await?;
                json!({ "Item": item })
            }
            Commands::Update {
                table,
                key,
                expression,
                values,
                names,
            } => {
                let key: Item = serde_json::from_str(key)
                    .map_err(|e| Error::invalid_request(format!("Invalid --key JSON: {e}")))?;
                let update = ItemUpdate {
                    key,
                    update_expression: expression.clone(),
                    expression_attribute_values: parse_values(values.as_deref())?,
                    expression_attribute_names: parse_names(names.as_deref())?,
                };
                let item = service.update_item(table, &update).await?;
                info!(
                    %table,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Update complete"
                );
                json!({ "Attributes": item })
            }
        };

        Ok(output)
    }

    /// Load configuration, applying command-line overrides
    fn load_config(&self) -> Result<StoreConfig> {
        let mut config = match &self.cli.config {
            Some(path) => StoreConfig::load(path)?,
            None => StoreConfig::default(),
        };

        if let Some(endpoint) = &self.cli.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(page_size) = self.cli.page_size {
            config.page_size = page_size;
        }

        Ok(config)
    }

    /// Build the store: a fixture-backed memory store or a remote one
    fn build_store(&self, config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
        if let Some(path) = &self.cli.fixture {
            let fixture = Fixture::load(path)?;
            info!(
                path = %path.display(),
                tables = fixture.tables.len(),
                page_size = config.page_size,
                "Using in-memory store"
            );
            return Ok(Arc::new(fixture.into_store(config.page_size)));
        }

        match &config.endpoint {
            Some(endpoint) => {
                info!(%endpoint, "Using remote store");
                let store = HttpStore::with_config(endpoint, config.to_http_client_config())?;
                Ok(Arc::new(store))
            }
            None => Err(Error::config(
                "No store configured. Provide --endpoint, --fixture or an endpoint in --config.",
            )),
        }
    }

    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
