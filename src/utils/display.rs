//! Terminal display utilities for record tables.
//!
//! Handles different screen sizes and Unicode text when rendering fetched
//! records with `comfy-table`.

use comfy_table::{Attribute, Cell, Table};
use std::io::{self, IsTerminal};
use std::sync::OnceLock;
use terminal_size::terminal_size;

use crate::models::{ColumnSet, ResultRecord};

/// Terminal information with cached size and capabilities.
#[derive(Debug, Clone)]
pub struct Terminal {
    width: usize,
    is_tty: bool,
}

static TERMINAL_INFO: OnceLock<Terminal> = OnceLock::new();

/// Get the global terminal information, initialized on first call.
pub fn terminal_info() -> &'static Terminal {
    TERMINAL_INFO.get_or_init(|| {
        let width = terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(DEFAULT_WIDTH);

        Terminal {
            width,
            is_tty: io::stdout().is_terminal(),
        }
    })
}

/// Default width when terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 100;

/// Narrowest a cell is squeezed to before truncation stops making sense.
const MIN_CELL_WIDTH: usize = 8;

/// Get the current terminal width in characters.
#[inline]
pub fn terminal_width() -> usize {
    terminal_info().width
}

/// Check if stdout is a terminal.
#[inline]
pub fn is_terminal() -> bool {
    terminal_info().is_tty
}

/// Truncate text to fit within the specified width using unicode-aware truncation.
///
/// Returns a string that fits within `max_width` columns, appending an
/// ellipsis if truncation occurred.
///
/// # Examples
///
/// ```
/// use research_query::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    let char_widths: Vec<(char, usize)> = text
        .chars()
        .map(|c| (c, unicode_width::UnicodeWidthChar::width(c).unwrap_or(1)))
        .collect();

    let total_width: usize = char_widths.iter().map(|(_, w)| *w).sum();

    if total_width <= max_width {
        return text.to_string();
    }

    // Reserve three columns for the ellipsis
    let mut current_width = 0;
    let mut end_idx = 0;

    for (i, (_c, w)) in char_widths.iter().enumerate() {
        if current_width + w > max_width.saturating_sub(3) {
            break;
        }
        current_width += w;
        end_idx = i + 1;
    }

    if end_idx == 0 {
        return "...".to_string();
    }

    let truncated: String = char_widths[..end_idx].iter().map(|(c, _)| *c).collect();
    format!("{}...", truncated)
}

/// Render a JSON value as cell text; strings lose their quotes.
pub fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Keys of the first record, in order. Records from one fetch share keys.
pub fn record_keys(records: &[ResultRecord]) -> Vec<&str> {
    records
        .first()
        .map(|record| record.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Width available to each cell when `columns` cells share `total_width`.
pub fn cell_width(total_width: usize, columns: usize) -> usize {
    if columns == 0 {
        return total_width;
    }
    // Each column costs three border/padding characters, plus the outer border
    let usable = total_width.saturating_sub(columns * 3 + 1);
    (usable / columns).max(MIN_CELL_WIDTH)
}

/// Build a table of `records`, labelling headers through `columns`.
pub fn records_table(records: &[ResultRecord], columns: &ColumnSet, width: usize) -> Table {
    let keys = record_keys(records);
    let max_cell = cell_width(width, keys.len());

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(
        keys.iter()
            .map(|key| Cell::new(columns.label_for(key)).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    for record in records {
        table.add_row(
            keys.iter()
                .map(|key| {
                    let text = record.get(*key).map(format_value).unwrap_or_default();
                    Cell::new(truncate_with_ellipsis(&text, max_cell))
                })
                .collect::<Vec<_>>(),
        );
    }

    table
}
