//! Free-text list of paper identifiers (PMIDs or DOIs).

use serde::{Deserialize, Serialize};

/// Comma-separated identifiers exactly as the user typed them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierList {
    raw: String,
}

impl IdentifierList {
    /// Create a list from raw text
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The raw text, unmodified
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Replace the raw text
    pub fn set(&mut self, raw: impl Into<String>) {
        self.raw = raw.into();
    }

    /// Trimmed, non-empty entries in input order
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.raw.split(',').map(str::trim).filter(|id| !id.is_empty())
    }

    /// Whether no usable entries are present
    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// OR-group of `<id>[PMID]` atoms, empty when there are no entries
    pub fn clause(&self) -> String {
        self.entries()
            .map(|id| format!("{}[PMID]", id))
            .collect::<Vec<_>>()
            .join(" OR ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_trim_and_drop_blanks() {
        let ids = IdentifierList::new("123, doi:10.1/x , , 456");
        let entries: Vec<_> = ids.entries().collect();
        assert_eq!(entries, vec!["123", "doi:10.1/x", "456"]);
        assert_eq!(ids.raw(), "123, doi:10.1/x , , 456");
    }

    #[test]
    fn test_clause() {
        let ids = IdentifierList::new("123, 456");
        assert_eq!(ids.clause(), "123[PMID] OR 456[PMID]");
    }

    #[test]
    fn test_blank_list() {
        for raw in ["", "   ", ",,", " , , "] {
            let ids = IdentifierList::new(raw);
            assert!(ids.is_empty());
            assert_eq!(ids.clause(), "");
        }
    }
}
