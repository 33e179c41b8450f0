//! Query builder session: conditions, identifiers, compiled output and edit
//! mode kept in lockstep.

use serde::Serialize;

use crate::models::{ConditionPatch, IdentifierList, KeywordCondition};
use crate::query::{compile, CompiledQuery, ConditionStore, EditArbiter, EditMode};
use crate::sources::FetchRequest;
use crate::utils::{search_url, Clipboard, ClipboardError, LaunchError, UrlOpener, DEFAULT_SEARCH_HOST};

/// Result of a downstream action on the authoritative query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action ran
    Performed,
    /// The authoritative query was empty, nothing happened
    SkippedEmpty,
}

/// Keeps structured conditions and the query string synchronized
///
/// Every structured mutation recompiles immediately. Whether the compiled
/// string or the manual buffer is shown is decided by the [`EditArbiter`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    store: ConditionStore,
    identifiers: IdentifierList,
    compiled: CompiledQuery,
    arbiter: EditArbiter,
    search_host: String,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    /// Create an empty builder targeting PubMed
    pub fn new() -> Self {
        Self {
            store: ConditionStore::new(),
            identifiers: IdentifierList::default(),
            compiled: CompiledQuery::default(),
            arbiter: EditArbiter::new(),
            search_host: DEFAULT_SEARCH_HOST.to_string(),
        }
    }

    /// Create a builder from existing conditions and identifier text
    pub fn with_conditions(
        conditions: impl IntoIterator<Item = KeywordCondition>,
        identifier_text: impl Into<String>,
    ) -> Self {
        let mut builder = Self::new();
        builder.store = conditions.into_iter().collect();
        builder.identifiers = IdentifierList::new(identifier_text);
        builder.recompile();
        builder
    }

    /// Use a different host for [`Self::external_search_url`]
    pub fn search_host(mut self, host: impl Into<String>) -> Self {
        self.search_host = host.into();
        self
    }

    fn recompile(&mut self) {
        self.compiled = compile(self.store.as_slice(), &self.identifiers);
        tracing::debug!(
            conditions = self.store.len(),
            query = %self.compiled.serialized_query,
            "Recompiled query"
        );
    }

    fn structured_edit(&mut self) {
        self.recompile();
        self.arbiter.on_structured_edit();
    }

    // ========== STRUCTURED MUTATIONS ==========

    /// Append a blank condition, returning its position
    pub fn add_condition(&mut self) -> usize {
        let index = self.store.append();
        self.structured_edit();
        index
    }

    /// Append a prepared condition, returning its position
    pub fn push_condition(&mut self, condition: KeywordCondition) -> usize {
        let index = self.store.push(condition);
        self.structured_edit();
        index
    }

    /// Replace one attribute of the condition at `index`
    ///
    /// Returns `false` and leaves everything untouched when `index` is out of range.
    pub fn update_condition(&mut self, index: usize, patch: ConditionPatch) -> bool {
        if self.store.update(index, patch).is_none() {
            tracing::debug!("Ignoring update of missing condition {}", index);
            return false;
        }
        self.structured_edit();
        true
    }

    /// Remove the condition at `index`
    pub fn remove_condition(&mut self, index: usize) -> Option<KeywordCondition> {
        let removed = self.store.remove(index)?;
        self.structured_edit();
        Some(removed)
    }

    /// Remove every condition
    pub fn clear_conditions(&mut self) {
        self.store.clear();
        self.structured_edit();
    }

    /// Replace the identifier list text
    pub fn set_identifier_text(&mut self, text: impl Into<String>) {
        self.identifiers.set(text);
        self.structured_edit();
    }

    // ========== EDIT MODE ==========

    /// Enter manual mode, seeding the buffer with the current serialized query
    pub fn begin_manual_edit(&mut self) -> bool {
        self.arbiter.begin(&self.compiled.serialized_query)
    }

    /// Replace the manual buffer text; ignored outside manual mode
    pub fn set_manual_text(&mut self, text: impl Into<String>) -> bool {
        self.arbiter.set_text(text)
    }

    /// Leave manual mode, committing the buffer as the serialized query
    pub fn save_manual_edit(&mut self) -> bool {
        self.arbiter.save()
    }

    /// Begin or save a manual edit, whichever applies
    pub fn toggle_manual_edit(&mut self) -> bool {
        self.arbiter.toggle(&self.compiled.serialized_query)
    }

    // ========== OUTPUTS ==========

    /// Conditions in order
    pub fn conditions(&self) -> &[KeywordCondition] {
        self.store.as_slice()
    }

    /// Raw identifier text
    pub fn identifier_text(&self) -> &str {
        self.identifiers.raw()
    }

    /// Output of the most recent compilation
    pub fn compiled(&self) -> &CompiledQuery {
        &self.compiled
    }

    /// Serialized query on the structured side
    ///
    /// This is the compiled string, or the saved manual text until the next
    /// structured edit. While in manual mode it keeps tracking the conditions.
    pub fn serialized_query(&self) -> &str {
        self.arbiter.serialized(&self.compiled.serialized_query)
    }

    /// Readable paraphrase of the conditions
    pub fn readable_sentence(&self) -> &str {
        &self.compiled.readable_sentence
    }

    /// Readable sentence as it should be displayed: hidden in manual mode or when empty
    pub fn visible_sentence(&self) -> Option<&str> {
        let sentence = self.readable_sentence();
        (!self.is_manual_mode() && !sentence.is_empty()).then_some(sentence)
    }

    /// Whether the manual buffer is authoritative
    pub fn is_manual_mode(&self) -> bool {
        self.arbiter.is_manual()
    }

    /// Manual buffer text while in manual mode
    pub fn manual_buffer_text(&self) -> Option<&str> {
        self.arbiter.buffer()
    }

    /// Current edit mode
    pub fn edit_mode(&self) -> &EditMode {
        self.arbiter.mode()
    }

    /// The string downstream actions act on
    pub fn authoritative_query(&self) -> &str {
        self.arbiter.authoritative(&self.compiled.serialized_query)
    }

    // ========== DOWNSTREAM ACTIONS ==========

    /// Copy the authoritative query to `clipboard`
    ///
    /// Failures are logged and returned; builder state is never affected.
    pub fn copy_authoritative_query(
        &self,
        clipboard: &mut dyn Clipboard,
    ) -> Result<ActionOutcome, ClipboardError> {
        let query = self.authoritative_query();
        if query.is_empty() {
            return Ok(ActionOutcome::SkippedEmpty);
        }

        match clipboard.write_text(query) {
            Ok(()) => {
                tracing::info!("Query copied to clipboard");
                Ok(ActionOutcome::Performed)
            }
            Err(e) => {
                tracing::warn!("Failed to copy query: {}", e);
                Err(e)
            }
        }
    }

    /// External search URL for the authoritative query, `None` when empty
    pub fn external_search_url(&self) -> Option<String> {
        let query = self.authoritative_query();
        (!query.is_empty()).then(|| search_url(&self.search_host, query))
    }

    /// Open the external search page for the authoritative query
    pub fn open_in_external_search(
        &self,
        opener: &mut dyn UrlOpener,
    ) -> Result<ActionOutcome, LaunchError> {
        let Some(url) = self.external_search_url() else {
            return Ok(ActionOutcome::SkippedEmpty);
        };

        opener.open(&url).map_err(|e| {
            tracing::warn!("Failed to open external search: {}", e);
            e
        })?;
        Ok(ActionOutcome::Performed)
    }

    /// Snapshot handed to a result source
    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest {
            conditions: self.store.as_slice().to_vec(),
            identifier_text: self.identifiers.raw().to_string(),
            query: self.authoritative_query().to_string(),
        }
    }

    /// Serializable view of the builder outputs
    pub fn snapshot(&self) -> BuilderSnapshot<'_> {
        BuilderSnapshot {
            conditions: self.conditions(),
            identifier_text: self.identifier_text(),
            serialized_query: self.serialized_query(),
            readable_sentence: self.visible_sentence(),
            is_manual_mode: self.is_manual_mode(),
            manual_buffer_text: self.manual_buffer_text(),
            authoritative_query: self.authoritative_query(),
        }
    }
}

/// Borrowed view of everything a presentation layer renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderSnapshot<'a> {
    pub conditions: &'a [KeywordCondition],
    pub identifier_text: &'a str,
    pub serialized_query: &'a str,
    pub readable_sentence: Option<&'a str>,
    pub is_manual_mode: bool,
    pub manual_buffer_text: Option<&'a str>,
    pub authoritative_query: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BooleanOperator, SearchField};
    use crate::utils::{MemoryClipboard, RecordingOpener};

    fn builder_ab() -> QueryBuilder {
        QueryBuilder::with_conditions(
            vec![
                KeywordCondition::new("a", SearchField::Title),
                KeywordCondition::new("b", SearchField::Abstract),
            ],
            "",
        )
    }

    struct FailingClipboard;

    impl Clipboard for FailingClipboard {
        fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Unavailable("none".to_string()))
        }
    }

    #[test]
    fn test_add_condition_does_not_change_output() {
        let mut builder = QueryBuilder::new();
        assert_eq!(builder.add_condition(), 0);
        assert_eq!(builder.serialized_query(), "");
        assert_eq!(builder.readable_sentence(), "");
        assert!(builder.visible_sentence().is_none());
    }

    #[test]
    fn test_structured_edits_recompile() {
        let mut builder = QueryBuilder::new();
        let index = builder.add_condition();
        builder.update_condition(index, ConditionPatch::Keyword("cancer".into()));
        builder.update_condition(index, ConditionPatch::Field(Some(SearchField::Title)));
        assert_eq!(builder.serialized_query(), "cancer[Title]");
        assert_eq!(builder.visible_sentence(), Some("cancer in Title"));

        builder.set_identifier_text("1, 2");
        assert_eq!(
            builder.serialized_query(),
            "(cancer[Title]) AND (1[PMID] OR 2[PMID])"
        );
        assert_eq!(builder.readable_sentence(), "cancer in Title");
    }

    #[test]
    fn test_update_out_of_range() {
        let mut builder = builder_ab();
        assert!(!builder.update_condition(9, ConditionPatch::ExactPhrase(true)));
        assert_eq!(builder.serialized_query(), "a[Title] AND b[Abstract]");
    }

    #[test]
    fn test_remove_condition() {
        let mut builder = builder_ab();
        builder.update_condition(0, ConditionPatch::Operator(BooleanOperator::Or));
        let removed = builder.remove_condition(0).unwrap();
        assert_eq!(removed.keyword, "a");
        assert_eq!(builder.serialized_query(), "b[Abstract]");
        assert!(builder.remove_condition(5).is_none());
    }

    #[test]
    fn test_manual_edit_cycle() {
        let mut builder = builder_ab();
        assert!(builder.begin_manual_edit());
        assert_eq!(builder.manual_buffer_text(), Some("a[Title] AND b[Abstract]"));
        assert!(builder.visible_sentence().is_none());

        builder.set_manual_text("not [valid");
        assert_eq!(builder.authoritative_query(), "not [valid");
        assert_eq!(builder.readable_sentence(), "a in Title and b in Abstract");

        assert!(builder.save_manual_edit());
        assert!(!builder.is_manual_mode());
        assert_eq!(builder.serialized_query(), "not [valid");
        assert_eq!(builder.authoritative_query(), "not [valid");

        builder.update_condition(1, ConditionPatch::Keyword("c".into()));
        assert_eq!(builder.serialized_query(), "a[Title] AND c[Abstract]");
    }

    #[test]
    fn test_structured_edit_while_manual_keeps_buffer() {
        let mut builder = builder_ab();
        builder.begin_manual_edit();
        builder.set_manual_text("mine");
        builder.set_identifier_text("42");

        assert_eq!(builder.authoritative_query(), "mine");
        assert_eq!(
            builder.serialized_query(),
            "(a[Title] AND b[Abstract]) AND (42[PMID])"
        );
    }

    #[test]
    fn test_copy_uses_authoritative_query() {
        let mut builder = builder_ab();
        let mut clipboard = MemoryClipboard::new();

        let outcome = builder.copy_authoritative_query(&mut clipboard).unwrap();
        assert_eq!(outcome, ActionOutcome::Performed);
        assert_eq!(clipboard.contents(), Some("a[Title] AND b[Abstract]"));

        builder.begin_manual_edit();
        builder.set_manual_text("manual");
        builder.copy_authoritative_query(&mut clipboard).unwrap();
        assert_eq!(clipboard.contents(), Some("manual"));
    }

    #[test]
    fn test_copy_empty_is_noop() {
        let builder = QueryBuilder::new();
        let mut clipboard = MemoryClipboard::new();
        let outcome = builder.copy_authoritative_query(&mut clipboard).unwrap();
        assert_eq!(outcome, ActionOutcome::SkippedEmpty);
        assert_eq!(clipboard.writes(), 0);
    }

    #[test]
    fn test_copy_failure_leaves_state() {
        let builder = builder_ab();
        let before = builder.snapshot().serialized_query.to_string();
        assert!(builder
            .copy_authoritative_query(&mut FailingClipboard)
            .is_err());
        assert_eq!(builder.serialized_query(), before);
    }

    #[test]
    fn test_open_in_external_search() {
        let mut builder = QueryBuilder::new();
        let mut opener = RecordingOpener::new();
        assert_eq!(
            builder.open_in_external_search(&mut opener).unwrap(),
            ActionOutcome::SkippedEmpty
        );
        assert!(opener.opened().is_empty());

        builder.push_condition(KeywordCondition::new("cancer", SearchField::Title));
        builder.open_in_external_search(&mut opener).unwrap();
        assert_eq!(
            opener.opened(),
            ["https://pubmed.ncbi.nlm.nih.gov/?term=cancer%5BTitle%5D".to_string()]
        );
    }

    #[test]
    fn test_custom_search_host() {
        let builder = builder_ab().search_host("example.org");
        assert!(builder
            .external_search_url()
            .unwrap()
            .starts_with("https://example.org/?term="));
    }

    #[test]
    fn test_fetch_request_snapshot() {
        let mut builder = builder_ab();
        builder.set_identifier_text(" 7 ");
        let request = builder.fetch_request();
        assert_eq!(request.conditions.len(), 2);
        assert_eq!(request.identifier_text, " 7 ");
        assert_eq!(request.query, "(a[Title] AND b[Abstract]) AND (7[PMID])");
    }

    #[test]
    fn test_snapshot_serializes() {
        let builder = builder_ab();
        let json = serde_json::to_value(builder.snapshot()).unwrap();
        assert_eq!(json["serializedQuery"], "a[Title] AND b[Abstract]");
        assert_eq!(json["isManualMode"], false);
        assert!(json["manualBufferText"].is_null());
    }
}
