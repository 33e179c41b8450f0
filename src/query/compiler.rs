//! Compiles keyword conditions and identifiers into a PubMed query string
//! and a readable paraphrase.
//!
//! Atoms are folded strictly left to right; there is no operator precedence
//! and no grouping beyond the parentheses added when an identifier clause is
//! appended.

use serde::{Deserialize, Serialize};

use crate::models::{BooleanOperator, IdentifierList, KeywordCondition};

/// Output of [`compile`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledQuery {
    /// Machine-readable query in the external search syntax
    pub serialized_query: String,

    /// Prose paraphrase of the keyword conditions (identifiers excluded)
    pub readable_sentence: String,
}

/// A condition that survived filtering, with its original position
struct Atom<'a> {
    index: usize,
    keyword: &'a str,
    field: &'static str,
    exact: bool,
}

impl Atom<'_> {
    fn serialized(&self) -> String {
        if self.exact {
            format!("\"{}\"[{}]", self.keyword, self.field)
        } else {
            format!("{}[{}]", self.keyword, self.field)
        }
    }

    fn readable(&self) -> String {
        if self.exact {
            format!("\"{}\" in {}", self.keyword, self.field)
        } else {
            format!("{} in {}", self.keyword, self.field)
        }
    }
}

/// Compile conditions and identifiers
///
/// Never fails: conditions with a blank keyword or unset field, and blank
/// identifier entries, simply contribute nothing.
pub fn compile(conditions: &[KeywordCondition], identifiers: &IdentifierList) -> CompiledQuery {
    let atoms: Vec<Atom<'_>> = conditions
        .iter()
        .enumerate()
        .filter_map(|(index, condition)| {
            condition.compilable().map(|(keyword, field)| Atom {
                index,
                keyword,
                field: field.as_str(),
                exact: condition.exact_phrase,
            })
        })
        .collect();

    let mut folded = String::new();
    let mut sentence = String::new();

    for (rank, atom) in atoms.iter().enumerate() {
        if rank == 0 {
            folded = atom.serialized();
            sentence = atom.readable();
            continue;
        }

        let operator = joining_operator(conditions, atom.index);
        folded = format!("{} {} {}", folded, operator.as_str(), atom.serialized());
        sentence = format!("{} {} {}", sentence, operator.as_lowercase(), atom.readable());
    }

    let id_clause = identifiers.clause();
    let serialized_query = match (folded.is_empty(), id_clause.is_empty()) {
        (false, false) => format!("({}) AND ({})", folded, id_clause),
        (false, true) => folded,
        (true, false) => id_clause,
        (true, true) => String::new(),
    };

    CompiledQuery {
        serialized_query,
        readable_sentence: sentence,
    }
}

/// Operator stored on the condition immediately before `index`, excluded or not
fn joining_operator(conditions: &[KeywordCondition], index: usize) -> BooleanOperator {
    index
        .checked_sub(1)
        .and_then(|previous| conditions.get(previous))
        .map(|condition| condition.operator)
        .unwrap_or_default()
}
