//! Core data models for query conditions, identifiers and output columns.

mod column;
mod condition;
mod identifiers;

pub use column::{humanize_key, ColumnSet, OutputColumn, DEFAULT_COLUMN_DESCRIPTION};
pub use condition::{
    BooleanOperator, ConditionPatch, KeywordCondition, ParseConditionError, SearchField,
};
pub use identifiers::IdentifierList;

/// One row returned by a result source; keys keep insertion order
pub type ResultRecord = serde_json::Map<String, serde_json::Value>;
