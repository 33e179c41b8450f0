//! User-defined output columns used to label result fields.

use serde::{Deserialize, Serialize};

/// Description given to a freshly added column
pub const DEFAULT_COLUMN_DESCRIPTION: &str = "New Description";

/// A user label for one record field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputColumn {
    /// Record field this column labels
    pub key: String,

    /// Label shown in place of the key
    pub description: String,
}

impl OutputColumn {
    /// Create a column
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// Ordered set of output columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSet {
    columns: Vec<OutputColumn>,
}

impl ColumnSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a placeholder column named `customCol<n>`
    pub fn add(&mut self) -> &OutputColumn {
        let key = format!("customCol{}", self.columns.len() + 1);
        self.columns
            .push(OutputColumn::new(key, DEFAULT_COLUMN_DESCRIPTION));
        &self.columns[self.columns.len() - 1]
    }

    /// Append a fully specified column
    pub fn push(&mut self, column: OutputColumn) {
        self.columns.push(column);
    }

    /// Rename the key at `index`
    pub fn set_key(&mut self, index: usize, key: impl Into<String>) -> Option<&OutputColumn> {
        let column = self.columns.get_mut(index)?;
        column.key = key.into();
        Some(column)
    }

    /// Change the description at `index`
    pub fn set_description(
        &mut self,
        index: usize,
        description: impl Into<String>,
    ) -> Option<&OutputColumn> {
        let column = self.columns.get_mut(index)?;
        column.description = description.into();
        Some(column)
    }

    /// Remove the column at `index`
    pub fn remove(&mut self, index: usize) -> Option<OutputColumn> {
        (index < self.columns.len()).then(|| self.columns.remove(index))
    }

    /// Columns in order
    pub fn iter(&self) -> impl Iterator<Item = &OutputColumn> {
        self.columns.iter()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Header label for a record field
    ///
    /// Uses the description of the first column whose key matches, falling
    /// back to [`humanize_key`].
    pub fn label_for(&self, key: &str) -> String {
        self.columns
            .iter()
            .find(|column| column.key == key && !column.description.is_empty())
            .map(|column| column.description.clone())
            .unwrap_or_else(|| humanize_key(key))
    }
}

impl FromIterator<OutputColumn> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = OutputColumn>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Turn a camelCase key into a header: `customCol1` becomes `Custom Col1`
pub fn humanize_key(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            label.push(' ');
        }
        label.push(ch);
    }

    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
