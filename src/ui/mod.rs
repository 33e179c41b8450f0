//! Terminal UI helpers for the CLI: colored status lines, query panels and
//! the fetch spinner.

use owo_colors::OwoColorize;
use std::time::Duration;

use crate::models::KeywordCondition;
use crate::query::QueryBuilder;

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
}

/// Status icons for different outcomes.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
    }
}

/// A status message with its colored icon.
pub fn status_line(status: Status, msg: &str) -> String {
    let icon = status_icon(status);
    match status {
        Status::Success => format!("{} {}", icon.green().bold(), msg),
        Status::Error => format!("{} {}", icon.red().bold(), msg),
        Status::Warning => format!("{} {}", icon.yellow().bold(), msg),
        Status::Info => format!("{} {}", icon.cyan().bold(), msg),
    }
}

/// Print a styled status message.
pub fn print_status(status: Status, msg: &str) {
    match status {
        Status::Error | Status::Warning => eprintln!("{}", status_line(status, msg)),
        _ => println!("{}", status_line(status, msg)),
    }
}

/// Welcome banner for interactive sessions.
pub fn print_banner() {
    println!(
        "{} {} {}",
        "research-query".bold().cyan(),
        crate::VERSION.dimmed(),
        "(type 'help' for commands)".dimmed()
    );
}

/// One condition row as shown in a session: position, field, keyword, joiner.
pub fn condition_line(index: usize, condition: &KeywordCondition, is_last: bool) -> String {
    let field = condition
        .field
        .map(|field| field.as_str())
        .unwrap_or("(no field)");
    let keyword = if condition.keyword.trim().is_empty() {
        "(empty)".to_string()
    } else if condition.exact_phrase {
        format!("\"{}\"", condition.keyword)
    } else {
        condition.keyword.clone()
    };
    let joiner = if is_last {
        String::new()
    } else {
        format!(" {}", condition.operator.as_str())
    };

    format!("[{}] {}: {}{}", index, field, keyword, joiner)
}

/// Print the conditions, the query and its readable sentence.
pub fn print_query(builder: &QueryBuilder) {
    let conditions = builder.conditions();
    if conditions.is_empty() {
        println!("{}", "No conditions".dimmed());
    }
    for (index, condition) in conditions.iter().enumerate() {
        let line = condition_line(index, condition, index + 1 == conditions.len());
        if condition.compilable().is_some() {
            println!("  {}", line);
        } else {
            println!("  {}", line.dimmed());
        }
    }
    if !builder.identifier_text().trim().is_empty() {
        println!("  {} {}", "ids:".dimmed(), builder.identifier_text());
    }

    println!();
    if let Some(buffer) = builder.manual_buffer_text() {
        println!("{} {}", "Editing:".yellow().bold(), buffer);
    } else {
        let query = builder.authoritative_query();
        if query.is_empty() {
            println!("{} {}", "Query:".bold(), "(empty)".dimmed());
        } else {
            println!("{} {}", "Query:".bold(), query.green());
        }
    }
    if let Some(sentence) = builder.visible_sentence() {
        println!("{} {}", "Searching for:".bold(), sentence.italic());
    }
}

fn spinner_style(template: &str, tick_chars: &str) -> indicatif::ProgressStyle {
    indicatif::ProgressStyle::with_template(template)
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner())
        .tick_chars(tick_chars)
}

/// Loading spinner shown while results are fetched.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(spinner_style("{spinner:.cyan} {msg}", "⠁⠂⠄⡀⢀⠠⠐⠈ "));
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// A spinner that draws nothing, for quiet or non-terminal output.
    pub fn hidden() -> Self {
        Self {
            pb: indicatif::ProgressBar::hidden(),
        }
    }

    /// Set the message.
    pub fn set_message(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }

    /// Finish with success message.
    pub fn finish_with_success(&self, msg: &str) {
        self.pb.set_style(spinner_style("{spinner:.green} {msg}", "✓✓"));
        self.pb.finish_with_message(msg.to_string());
    }

    /// Finish with error message.
    pub fn finish_with_error(&self, msg: &str) {
        self.pb.set_style(spinner_style("{spinner:.red} {msg}", "✗✗"));
        self.pb.finish_with_message(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BooleanOperator, SearchField};

    #[test]
    fn test_status_icons() {
        assert_eq!(status_icon(Status::Success), "✓");
        assert_eq!(status_icon(Status::Error), "✗");
        assert!(status_line(Status::Info, "hello").contains("hello"));
    }

    #[test]
    fn test_condition_line() {
        let condition =
            KeywordCondition::new("cancer", SearchField::Title).operator(BooleanOperator::Or);
        assert_eq!(condition_line(0, &condition, false), "[0] Title: cancer OR");
        assert_eq!(condition_line(0, &condition, true), "[0] Title: cancer");

        let exact = KeywordCondition::new("heart attack", SearchField::MeshTerms).exact(true);
        assert_eq!(
            condition_line(2, &exact, true),
            "[2] MeSH Terms: \"heart attack\""
        );

        let blank = KeywordCondition::default();
        assert_eq!(
            condition_line(1, &blank, true),
            "[1] Title/Abstract: (empty)"
        );
    }

    #[test]
    fn test_hidden_spinner() {
        let spinner = Spinner::hidden();
        spinner.set_message("working");
        spinner.finish_with_success("done");
    }
}
