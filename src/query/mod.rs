//! Boolean query expression builder.
//!
//! - [`ConditionStore`]: ordered keyword conditions, the structured source of truth
//! - [`compile`]: pure conversion of conditions and identifiers into a query string
//!   and a readable sentence
//! - [`EditArbiter`]: structured/manual edit-mode state machine
//! - [`QueryBuilder`]: the session facade tying the three together
//!
//! ```rust
//! use research_query::models::{ConditionPatch, SearchField};
//! use research_query::query::QueryBuilder;
//!
//! let mut builder = QueryBuilder::new();
//! let index = builder.add_condition();
//! builder.update_condition(index, ConditionPatch::Keyword("cancer".into()));
//! builder.update_condition(index, ConditionPatch::Field(Some(SearchField::Title)));
//! builder.set_identifier_text("12345678");
//!
//! assert_eq!(builder.serialized_query(), "(cancer[Title]) AND (12345678[PMID])");
//! assert_eq!(builder.readable_sentence(), "cancer in Title");
//! ```

mod arbiter;
mod builder;
mod compiler;
mod store;

pub use arbiter::{EditArbiter, EditMode};
pub use builder::{ActionOutcome, BuilderSnapshot, QueryBuilder};
pub use compiler::{compile, CompiledQuery};
pub use store::ConditionStore;
