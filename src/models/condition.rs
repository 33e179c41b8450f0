//! Keyword condition model: one field-scoped clause of a boolean query.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field a keyword is scoped to in the PubMed search syntax
///
/// Deserializes through [`FromStr`], so config files accept the same aliases
/// as the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SearchField {
    #[serde(rename = "Title")]
    Title,
    #[serde(rename = "Abstract")]
    Abstract,
    #[serde(rename = "Title/Abstract")]
    #[default]
    TitleAbstract,
    #[serde(rename = "Author")]
    Author,
    #[serde(rename = "MeSH Terms")]
    MeshTerms,
}

impl SearchField {
    /// Every field, in the order a field picker lists them
    pub const ALL: [SearchField; 5] = [
        SearchField::Title,
        SearchField::Abstract,
        SearchField::TitleAbstract,
        SearchField::Author,
        SearchField::MeshTerms,
    ];

    /// Tag written between the brackets of a serialized atom
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Title => "Title",
            SearchField::Abstract => "Abstract",
            SearchField::TitleAbstract => "Title/Abstract",
            SearchField::Author => "Author",
            SearchField::MeshTerms => "MeSH Terms",
        }
    }

    /// Short PubMed tags accepted as input aliases
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            SearchField::Title => &["ti"],
            SearchField::Abstract => &["ab"],
            SearchField::TitleAbstract => &["tiab"],
            SearchField::Author => &["au"],
            SearchField::MeshTerms => &["mh", "mesh"],
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a field or operator name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseConditionError {
    #[error("Unknown search field: {0}")]
    UnknownField(String),

    #[error("Unknown boolean operator: {0} (expected AND or OR)")]
    UnknownOperator(String),
}

impl FromStr for SearchField {
    type Err = ParseConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        SearchField::ALL
            .into_iter()
            .find(|field| {
                field.as_str().eq_ignore_ascii_case(needle)
                    || field
                        .aliases()
                        .iter()
                        .any(|alias| alias.eq_ignore_ascii_case(needle))
            })
            .ok_or_else(|| ParseConditionError::UnknownField(needle.to_string()))
    }
}

impl<'de> Deserialize<'de> for SearchField {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Boolean joiner placed between a condition and the one after it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BooleanOperator {
    #[default]
    And,
    Or,
}

impl BooleanOperator {
    /// Upper-case form used in the serialized query
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOperator::And => "AND",
            BooleanOperator::Or => "OR",
        }
    }

    /// Lower-case form used in the readable sentence
    pub fn as_lowercase(&self) -> &'static str {
        match self {
            BooleanOperator::And => "and",
            BooleanOperator::Or => "or",
        }
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BooleanOperator {
    type Err = ParseConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(BooleanOperator::And),
            "OR" => Ok(BooleanOperator::Or),
            _ => Err(ParseConditionError::UnknownOperator(s.trim().to_string())),
        }
    }
}

/// One atomic search clause
///
/// The `operator` joins this condition to the *next* one in the store, so
/// the operator of the last condition is never rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordCondition {
    /// Keyword text, trimmed at compile time
    pub keyword: String,

    /// Field the keyword is scoped to; `None` excludes the condition
    pub field: Option<SearchField>,

    /// Whether the keyword is quoted as an exact phrase
    pub exact_phrase: bool,

    /// Joiner placed before the next condition
    pub operator: BooleanOperator,
}

impl Default for KeywordCondition {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            field: Some(SearchField::default()),
            exact_phrase: false,
            operator: BooleanOperator::default(),
        }
    }
}

impl KeywordCondition {
    /// Create a condition for `keyword` scoped to `field`
    pub fn new(keyword: impl Into<String>, field: SearchField) -> Self {
        Self {
            keyword: keyword.into(),
            field: Some(field),
            ..Default::default()
        }
    }

    /// Mark the keyword as an exact phrase
    pub fn exact(mut self, exact: bool) -> Self {
        self.exact_phrase = exact;
        self
    }

    /// Set the joiner to the next condition
    pub fn operator(mut self, operator: BooleanOperator) -> Self {
        self.operator = operator;
        self
    }

    /// Trimmed keyword and field, or `None` if the condition does not compile
    pub fn compilable(&self) -> Option<(&str, SearchField)> {
        let keyword = self.keyword.trim();
        match self.field {
            Some(field) if !keyword.is_empty() => Some((keyword, field)),
            _ => None,
        }
    }

    /// Replace the attribute named by `patch`, leaving the others untouched
    pub fn apply(&mut self, patch: ConditionPatch) {
        match patch {
            ConditionPatch::Keyword(keyword) => self.keyword = keyword,
            ConditionPatch::Field(field) => self.field = field,
            ConditionPatch::ExactPhrase(exact) => self.exact_phrase = exact,
            ConditionPatch::Operator(operator) => self.operator = operator,
        }
    }
}

/// A single-attribute edit to a condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "attribute", content = "value")]
pub enum ConditionPatch {
    Keyword(String),
    Field(Option<SearchField>),
    ExactPhrase(bool),
    Operator(BooleanOperator),
}
