//! # Research Query
//!
//! A boolean query expression builder for PubMed-style literature searches.
//! Structured keyword conditions and a single query string are kept in sync
//! in both directions, alongside a readable paraphrase of the conditions.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (conditions, identifiers, output columns)
//! - [`query`]: Condition store, expression compiler, edit-mode arbiter and the
//!   [`QueryBuilder`] facade
//! - [`session`]: Command grammar for interactive sessions and CLI terms
//! - [`sources`]: Result sources behind an async trait, with a mock implementation
//! - [`ui`]: Colored terminal output and the fetch spinner
//! - [`utils`]: Clipboard, URL opener, retry and table display helpers
//! - [`config`]: Configuration management

pub mod config;
pub mod models;
pub mod query;
pub mod session;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use models::{BooleanOperator, KeywordCondition, SearchField};
pub use query::QueryBuilder;
pub use sources::{MockResultSource, ResultSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
