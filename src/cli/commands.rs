//! CLI commands and argument parsing

use crate::error::{Error, Result};
use crate::store::PageRequest;
use crate::types::JsonObject;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Windowed and exhaustive reads over a cursor-paged document store
#[derive(Parser, Debug)]
#[command(name = "docstore-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Remote store endpoint (overrides the config file)
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// Fixture file for the in-memory store (JSON)
    #[arg(long, global = true, conflicts_with = "endpoint")]
    pub fixture: Option<PathBuf>,

    /// Page size of the in-memory store
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read the items at positions [min, max)
    Range {
        /// `query` or `scan`
        operation: String,

        /// First position in the window
        #[arg(long)]
        min: Option<u64>,

        /// First position past the window
        #[arg(long)]
        max: Option<u64>,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Read every item
    All {
        /// `query` or `scan`
        operation: String,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Count every item
    Count {
        /// `query` or `scan`
        operation: String,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Fetch one item by key
    Get {
        /// Table to read from
        #[arg(short, long)]
        table: String,

        /// Primary key (JSON object)
        #[arg(short, long)]
        key: String,
    },

    /// Update one item with a `SET` expression
    Update {
        /// Table holding the item
        #[arg(short, long)]
        table: String,

        /// Primary key (JSON object)
        #[arg(short, long)]
        key: String,

        /// Update expression, e.g. 'SET #s = :s'
        #[arg(long)]
        expression: String,

        /// Placeholder values (JSON object)
        #[arg(long)]
        values: Option<String>,

        /// Placeholder attribute names (JSON object)
        #[arg(long)]
        names: Option<String>,
    },
}

/// Request parameters shared by the read commands
#[derive(Args, Debug, Clone, Default)]
pub struct RequestArgs {
    /// Table to read from
    #[arg(short, long)]
    pub table: String,

    /// Secondary index to read from
    #[arg(long)]
    pub index: Option<String>,

    /// Key condition expression (query only)
    #[arg(long)]
    pub key_condition: Option<String>,

    /// Filter expression
    #[arg(long)]
    pub filter: Option<String>,

    /// Projection expression
    #[arg(long)]
    pub projection: Option<String>,

    /// Placeholder values (JSON object, e.g. '{":pk": "user#1"}')
    #[arg(long)]
    pub values: Option<String>,

    /// Placeholder attribute names (JSON object, e.g. '{"#s": "status"}')
    #[arg(long)]
    pub names: Option<String>,

    /// Items evaluated per page
    #[arg(long)]
    pub limit: Option<u32>,
}

impl RequestArgs {
    /// Build the page request these arguments describe
    pub fn to_request(&self) -> Result<PageRequest> {
        let mut request = PageRequest::new(&self.table);
        request.index_name.clone_from(&self.index);
        request.key_condition_expression.clone_from(&self.key_condition);
        request.filter_expression.clone_from(&self.filter);
        request.projection_expression.clone_from(&self.projection);
        request.limit = self.limit;

        request.expression_attribute_values = parse_values(self.values.as_deref())?;
        request.expression_attribute_names = parse_names(self.names.as_deref())?;

        Ok(request)
    }
}

/// Parse a `--values` argument; absent means no placeholders
pub fn parse_values(values: Option<&str>) -> Result<JsonObject> {
    values.map_or_else(
        || Ok(JsonObject::new()),
        |values| {
            serde_json::from_str(values)
                .map_err(|e| Error::invalid_request(format!("Invalid --values JSON: {e}")))
        },
    )
}

/// Parse a `--names` argument; absent means no placeholders
pub fn parse_names(names: Option<&str>) -> Result<BTreeMap<String, String>> {
    names.map_or_else(
        || Ok(BTreeMap::new()),
        |names| {
            serde_json::from_str(names)
                .map_err(|e| Error::invalid_request(format!("Invalid --names JSON: {e}")))
        },
    )
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Indented JSON
    Pretty,
}
