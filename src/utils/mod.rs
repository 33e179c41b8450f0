//! Utility modules supporting the query builder and CLI.
//!
//! - [`Clipboard`], [`SystemClipboard`], [`MemoryClipboard`]: where copied queries go
//! - [`UrlOpener`], [`SystemUrlOpener`], [`RecordingOpener`]: opening the external search page
//! - [`search_url`]: build the external search URL for a query
//! - [`RetryConfig`], [`with_retry`]: retry result fetches with exponential backoff
//! - [`records_table`]: render fetched records with labelled headers
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use research_query::sources::{FetchRequest, MockResultSource, ResultSource};
//! use research_query::utils::{with_retry, RetryConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = MockResultSource::new();
//! let request = FetchRequest::from_query("cancer[Title]");
//! let records = with_retry(RetryConfig::default().max_attempts(3), || source.fetch(&request)).await?;
//! # Ok(())
//! # }
//! ```

mod clipboard;
mod display;
mod opener;
mod retry;

pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard, SystemClipboard};
pub use display::{
    cell_width, format_value, is_terminal, record_keys, records_table, terminal_width,
    truncate_with_ellipsis, DEFAULT_WIDTH,
};
pub use opener::{search_url, LaunchError, RecordingOpener, SystemUrlOpener, UrlOpener, DEFAULT_SEARCH_HOST};
pub use retry::{with_retry, RetryConfig};
