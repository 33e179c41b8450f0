//! Ordered store of keyword conditions.

use serde::{Deserialize, Serialize};

use crate::models::{ConditionPatch, KeywordCondition};

/// Ordered sequence of keyword conditions
///
/// Order is significant: each condition's operator binds the gap to the
/// condition after it, folded strictly left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionStore {
    conditions: Vec<KeywordCondition>,
}

impl ConditionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a blank condition (Title/Abstract, not exact, AND)
    pub fn append(&mut self) -> usize {
        self.push(KeywordCondition::default())
    }

    /// Append a prepared condition, returning its position
    pub fn push(&mut self, condition: KeywordCondition) -> usize {
        self.conditions.push(condition);
        self.conditions.len() - 1
    }

    /// Replace one attribute of the condition at `index`
    ///
    /// Returns `None` without touching the store when `index` is out of range.
    pub fn update(&mut self, index: usize, patch: ConditionPatch) -> Option<&KeywordCondition> {
        let condition = self.conditions.get_mut(index)?;
        condition.apply(patch);
        Some(condition)
    }

    /// Remove the condition at `index`; later conditions shift down by one
    ///
    /// Operators stored on the remaining conditions are left as they are.
    pub fn remove(&mut self, index: usize) -> Option<KeywordCondition> {
        (index < self.conditions.len()).then(|| self.conditions.remove(index))
    }

    /// Remove every condition
    pub fn clear(&mut self) {
        self.conditions.clear();
    }

    /// Condition at `index`
    pub fn get(&self, index: usize) -> Option<&KeywordCondition> {
        self.conditions.get(index)
    }

    /// All conditions in order
    pub fn as_slice(&self) -> &[KeywordCondition] {
        &self.conditions
    }

    /// Number of conditions, compilable or not
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether the store holds no conditions
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl FromIterator<KeywordCondition> for ConditionStore {
    fn from_iter<I: IntoIterator<Item = KeywordCondition>>(iter: I) -> Self {
        Self {
            conditions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BooleanOperator, SearchField};

    fn store_abc() -> ConditionStore {
        vec![
            KeywordCondition::new("a", SearchField::Title).operator(BooleanOperator::Or),
            KeywordCondition::new("b", SearchField::Abstract).operator(BooleanOperator::And),
            KeywordCondition::new("c", SearchField::Author).operator(BooleanOperator::Or),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_append_defaults() {
        let mut store = ConditionStore::new();
        assert_eq!(store.append(), 0);
        assert_eq!(store.append(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1), Some(&KeywordCondition::default()));
    }

    #[test]
    fn test_update_preserves_order_and_other_positions() {
        let mut store = store_abc();
        let before = store.clone();

        let updated = store
            .update(1, ConditionPatch::Keyword("beta".to_string()))
            .cloned();
        assert_eq!(updated.unwrap().keyword, "beta");

        assert_eq!(store.get(0), before.get(0));
        assert_eq!(store.get(2), before.get(2));
        assert_eq!(store.get(1).unwrap().field, Some(SearchField::Abstract));
    }

    #[test]
    fn test_update_out_of_range_is_noop() {
        let mut store = store_abc();
        let before = store.clone();
        assert!(store.update(3, ConditionPatch::ExactPhrase(true)).is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn test_remove_shifts_without_reassigning_operators() {
        let mut store = store_abc();
        let removed = store.remove(1).unwrap();
        assert_eq!(removed.keyword, "b");

        let keywords: Vec<_> = store.as_slice().iter().map(|c| c.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["a", "c"]);
        assert_eq!(store.get(0).unwrap().operator, BooleanOperator::Or);
        assert_eq!(store.get(1).unwrap().operator, BooleanOperator::Or);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut store = store_abc();
        assert!(store.remove(7).is_none());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut store = store_abc();
        store.clear();
        assert!(store.is_empty());
    }
}
