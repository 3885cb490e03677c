//! CLI module
//!
//! Command-line front end over the store service.
//!
//! # Commands
//!
//! - `range` - Items at positions `[min, max)` of a query or scan
//! - `all` - Every item of a query or scan
//! - `count` - Number of items of a query or scan
//! - `get` - One item by primary key
//! - `update` - Apply a `SET` expression to one item

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, RequestArgs};
pub use runner::{Fixture, FixtureTable, Runner};

#[cfg(test)]
mod tests;
