//! Line-oriented command grammar for driving a [`QueryBuilder`].
//!
//! Two input forms are understood here:
//!
//! - session lines such as `set 0 field title` or `column desc 1 Score`,
//!   parsed by [`SessionCommand`]'s `FromStr` and applied with [`Session::apply`]
//! - CLI term lists such as `ti:cancer or au:smith`, parsed by [`parse_terms`]
//!
//! Neither form ever mutates the builder when parsing fails.

use std::str::FromStr;
use thiserror::Error;

use crate::models::{
    BooleanOperator, ColumnSet, ConditionPatch, KeywordCondition, OutputColumn,
    ParseConditionError, SearchField,
};
use crate::query::QueryBuilder;

/// Help shown by the `help` command
pub const HELP: &str = "\
Conditions (positions start at 0):
  add                          append a blank condition
  set <i> keyword <text>       change the keyword
  set <i> field <name|none>    change the field (title, abstract, tiab, author, mesh)
  set <i> exact <on|off>       toggle exact phrase quoting
  set <i> op <and|or>          operator joining this condition to the next
  rm <i>                       remove a condition
  clear                        remove every condition
  ids <text>                   comma-separated PMIDs or DOIs (empty clears)

Manual editing:
  edit                         start editing the query text directly
  text <text>                  replace the text being edited
  save                         use the edited text as the query
  toggle                       edit or save, whichever applies

Output:
  show                         print the current query
  copy | open | url            copy, open or print the search link
  fetch                        fetch results for the current query
  column add                   add an output column
  column key <i> <text>        rename a column key
  column desc <i> <text>       change a column description
  column rm <i>                remove a column

  help                         this text
  quit | exit                  leave the session";

/// Errors from parsing a session line or CLI terms
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: '{0}' (try 'help')")]
    UnknownCommand(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{command}' takes no arguments, got '{extra}'")]
    UnexpectedArgument {
        command: &'static str,
        extra: String,
    },

    #[error("Invalid position: '{0}'")]
    InvalidIndex(String),

    #[error("Unknown condition attribute: '{0}' (expected keyword, field, exact or op)")]
    UnknownAttribute(String),

    #[error("Expected on or off, got '{0}'")]
    InvalidFlag(String),

    #[error("Operator '{0}' must sit between two terms")]
    DanglingOperator(String),

    #[error("Empty search term: '{0}'")]
    EmptyTerm(String),

    #[error(transparent)]
    Condition(#[from] ParseConditionError),
}

/// Column customization commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnCommand {
    Add,
    Key { index: usize, key: String },
    Description { index: usize, description: String },
    Remove(usize),
}

/// One parsed session line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Add,
    Set { index: usize, patch: ConditionPatch },
    Remove(usize),
    Clear,
    Ids(String),
    Edit,
    Text(String),
    Save,
    Toggle,
    Show,
    Copy,
    Open,
    Url,
    Fetch,
    Column(ColumnCommand),
    Help,
    Quit,
}

/// Split off the first whitespace-delimited word
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(pos) => (&input[..pos], input[pos..].trim_start()),
        None => (input, ""),
    }
}

fn parse_index(word: &str, command: &'static str) -> Result<usize, CommandError> {
    if word.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "a position",
        });
    }
    word.parse()
        .map_err(|_| CommandError::InvalidIndex(word.to_string()))
}

fn parse_flag(word: &str) -> Result<bool, CommandError> {
    match word.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(CommandError::InvalidFlag(word.to_string())),
    }
}

fn no_arguments(command: &'static str, rest: &str, parsed: SessionCommand) -> Result<SessionCommand, CommandError> {
    if rest.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::UnexpectedArgument {
            command,
            extra: rest.to_string(),
        })
    }
}

fn parse_set(rest: &str) -> Result<SessionCommand, CommandError> {
    let (index, rest) = split_word(rest);
    let index = parse_index(index, "set")?;
    let (attribute, value) = split_word(rest);

    let patch = match attribute.to_ascii_lowercase().as_str() {
        "" => {
            return Err(CommandError::MissingArgument {
                command: "set",
                argument: "an attribute",
            })
        }
        "keyword" | "kw" => ConditionPatch::Keyword(value.to_string()),
        "field" => match value.to_ascii_lowercase().as_str() {
            "" => {
                return Err(CommandError::MissingArgument {
                    command: "set field",
                    argument: "a field name",
                })
            }
            "none" | "unset" => ConditionPatch::Field(None),
            _ => ConditionPatch::Field(Some(value.parse::<SearchField>()?)),
        },
        "exact" => ConditionPatch::ExactPhrase(parse_flag(value)?),
        "op" | "operator" => ConditionPatch::Operator(value.parse::<BooleanOperator>()?),
        other => return Err(CommandError::UnknownAttribute(other.to_string())),
    };

    Ok(SessionCommand::Set { index, patch })
}

fn parse_column(rest: &str) -> Result<SessionCommand, CommandError> {
    let (action, rest) = split_word(rest);

    let command = match action.to_ascii_lowercase().as_str() {
        "add" => return no_arguments("column add", rest, SessionCommand::Column(ColumnCommand::Add)),
        "key" => {
            let (index, key) = split_word(rest);
            let index = parse_index(index, "column key")?;
            if key.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "column key",
                    argument: "a key",
                });
            }
            ColumnCommand::Key {
                index,
                key: key.to_string(),
            }
        }
        "desc" | "description" => {
            let (index, description) = split_word(rest);
            ColumnCommand::Description {
                index: parse_index(index, "column desc")?,
                description: description.to_string(),
            }
        }
        "rm" | "remove" => {
            let (index, extra) = split_word(rest);
            let index = parse_index(index, "column rm")?;
            return no_arguments("column rm", extra, SessionCommand::Column(ColumnCommand::Remove(index)));
        }
        "" => {
            return Err(CommandError::MissingArgument {
                command: "column",
                argument: "add, key, desc or rm",
            })
        }
        other => return Err(CommandError::UnknownCommand(format!("column {}", other))),
    };

    Ok(SessionCommand::Column(command))
}

impl FromStr for SessionCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (verb, rest) = split_word(line.trim());
        let rest = rest.trim_end();

        match verb.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "add" => no_arguments("add", rest, SessionCommand::Add),
            "set" => parse_set(rest),
            "rm" | "remove" => {
                let (index, extra) = split_word(rest);
                let index = parse_index(index, "rm")?;
                no_arguments("rm", extra, SessionCommand::Remove(index))
            }
            "clear" => no_arguments("clear", rest, SessionCommand::Clear),
            "ids" => Ok(SessionCommand::Ids(rest.to_string())),
            "edit" => no_arguments("edit", rest, SessionCommand::Edit),
            "text" => Ok(SessionCommand::Text(rest.to_string())),
            "save" => no_arguments("save", rest, SessionCommand::Save),
            "toggle" => no_arguments("toggle", rest, SessionCommand::Toggle),
            "show" => no_arguments("show", rest, SessionCommand::Show),
            "copy" => no_arguments("copy", rest, SessionCommand::Copy),
            "open" => no_arguments("open", rest, SessionCommand::Open),
            "url" => no_arguments("url", rest, SessionCommand::Url),
            "fetch" => no_arguments("fetch", rest, SessionCommand::Fetch),
            "column" | "col" => parse_column(rest),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" => Ok(SessionCommand::Quit),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }
}

/// What the caller should do after a command was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Builder or column state changed
    Updated,
    /// Nothing changed; the reason is shown to the user
    Ignored(String),
    Show,
    Copy,
    Open,
    Url,
    Fetch,
    Help,
    Quit,
}

/// A query builder plus the output columns of an interactive session
#[derive(Debug, Clone, Default)]
pub struct Session {
    builder: QueryBuilder,
    columns: ColumnSet,
}

impl Session {
    /// Start a session around `builder`
    pub fn new(builder: QueryBuilder) -> Self {
        Self {
            builder,
            columns: ColumnSet::new(),
        }
    }

    /// Use an existing column set
    pub fn with_columns(mut self, columns: ColumnSet) -> Self {
        self.columns = columns;
        self
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Parse and apply one line
    pub fn execute_line(&mut self, line: &str) -> Result<Effect, CommandError> {
        let command: SessionCommand = line.parse()?;
        Ok(self.apply(command))
    }

    /// Apply a parsed command to the session state
    ///
    /// Commands with side effects outside the session (copy, open, fetch) only
    /// report what to do; the caller owns the collaborators.
    pub fn apply(&mut self, command: SessionCommand) -> Effect {
        match command {
            SessionCommand::Add => {
                let index = self.builder.add_condition();
                tracing::debug!("Added condition {}", index);
                Effect::Updated
            }
            SessionCommand::Set { index, patch } => {
                if self.builder.update_condition(index, patch) {
                    Effect::Updated
                } else {
                    missing_condition(index)
                }
            }
            SessionCommand::Remove(index) => match self.builder.remove_condition(index) {
                Some(_) => Effect::Updated,
                None => missing_condition(index),
            },
            SessionCommand::Clear => {
                self.builder.clear_conditions();
                Effect::Updated
            }
            SessionCommand::Ids(text) => {
                self.builder.set_identifier_text(text);
                Effect::Updated
            }
            SessionCommand::Edit => {
                if self.builder.begin_manual_edit() {
                    Effect::Updated
                } else {
                    Effect::Ignored("already editing the query text".to_string())
                }
            }
            SessionCommand::Text(text) => {
                if self.builder.set_manual_text(text) {
                    Effect::Updated
                } else {
                    Effect::Ignored("not editing the query text; use 'edit' first".to_string())
                }
            }
            SessionCommand::Save => {
                if self.builder.save_manual_edit() {
                    Effect::Updated
                } else {
                    Effect::Ignored("nothing to save; use 'edit' first".to_string())
                }
            }
            SessionCommand::Toggle => {
                self.builder.toggle_manual_edit();
                Effect::Updated
            }
            SessionCommand::Column(column) => self.apply_column(column),
            SessionCommand::Show => Effect::Show,
            SessionCommand::Copy => Effect::Copy,
            SessionCommand::Open => Effect::Open,
            SessionCommand::Url => Effect::Url,
            SessionCommand::Fetch => Effect::Fetch,
            SessionCommand::Help => Effect::Help,
            SessionCommand::Quit => Effect::Quit,
        }
    }

    fn apply_column(&mut self, command: ColumnCommand) -> Effect {
        let changed = match command {
            ColumnCommand::Add => {
                self.columns.add();
                true
            }
            ColumnCommand::Key { index, key } => self.columns.set_key(index, key).is_some(),
            ColumnCommand::Description { index, description } => {
                self.columns.set_description(index, description).is_some()
            }
            ColumnCommand::Remove(index) => self.columns.remove(index).is_some(),
        };

        if changed {
            Effect::Updated
        } else {
            Effect::Ignored("no column at that position".to_string())
        }
    }
}

fn missing_condition(index: usize) -> Effect {
    Effect::Ignored(format!("no condition at position {}", index))
}

/// Parse one `[Field:]keyword` term; a keyword in double quotes is exact
pub fn parse_term(term: &str, default_field: SearchField) -> Result<KeywordCondition, CommandError> {
    let (field, keyword) = match term.split_once(':') {
        Some((prefix, rest)) => match prefix.parse::<SearchField>() {
            Ok(field) => (field, rest),
            Err(_) => (default_field, term),
        },
        None => (default_field, term),
    };

    let keyword = keyword.trim();
    let (keyword, exact) = match keyword
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => (inner.trim(), true),
        None => (keyword, false),
    };

    if keyword.is_empty() {
        return Err(CommandError::EmptyTerm(term.to_string()));
    }

    Ok(KeywordCondition::new(keyword, field).exact(exact))
}

/// Parse CLI terms: keyword terms optionally separated by `and`/`or`
///
/// A missing operator between two terms means AND. The operator is stored on
/// the term before it, matching how conditions carry their joiner.
pub fn parse_terms<I>(terms: I, default_field: SearchField) -> Result<Vec<KeywordCondition>, CommandError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut conditions: Vec<KeywordCondition> = Vec::new();
    let mut pending: Option<String> = None;

    for token in terms {
        let token = token.as_ref();
        if let Ok(operator) = token.parse::<BooleanOperator>() {
            if conditions.is_empty() || pending.is_some() {
                return Err(CommandError::DanglingOperator(token.to_string()));
            }
            if let Some(last) = conditions.last_mut() {
                last.operator = operator;
            }
            pending = Some(token.to_string());
            continue;
        }

        conditions.push(parse_term(token, default_field)?);
        pending = None;
    }

    if let Some(token) = pending {
        return Err(CommandError::DanglingOperator(token));
    }

    Ok(conditions)
}

/// Parse `key=description` column definitions
pub fn parse_column_spec(spec: &str) -> OutputColumn {
    match spec.split_once('=') {
        Some((key, description)) => OutputColumn::new(key.trim(), description.trim()),
        None => OutputColumn::new(spec.trim(), ""),
    }
}
