//! Integration tests for Research Query
//!
//! These tests drive the public API the way the CLI and interactive sessions do.

use research_query::models::{
    BooleanOperator, ColumnSet, ConditionPatch, KeywordCondition, OutputColumn, SearchField,
};
use research_query::query::{ActionOutcome, EditMode, QueryBuilder};
use research_query::session::{parse_terms, Effect, Session};
use research_query::sources::{FetchError, FetchRequest, MockResultSource, ResultSource};
use research_query::utils::{
    records_table, with_retry, MemoryClipboard, RecordingOpener, RetryConfig,
};
use std::time::Duration;

fn two_condition_builder() -> QueryBuilder {
    QueryBuilder::with_conditions(
        vec![
            KeywordCondition::new("a", SearchField::Title),
            KeywordCondition::new("b", SearchField::Abstract),
        ],
        "",
    )
}

#[test]
fn test_blank_builder_compiles_to_nothing() {
    let mut builder = QueryBuilder::new();
    builder.add_condition();
    builder.add_condition();

    assert_eq!(builder.serialized_query(), "");
    assert_eq!(builder.readable_sentence(), "");
    assert!(builder.visible_sentence().is_none());
    assert!(builder.external_search_url().is_none());
}

#[test]
fn test_single_condition_quoting() {
    let mut builder = QueryBuilder::new();
    let index = builder.add_condition();
    builder.update_condition(index, ConditionPatch::Keyword("cancer".to_string()));
    builder.update_condition(index, ConditionPatch::Field(Some(SearchField::Title)));

    assert_eq!(builder.serialized_query(), "cancer[Title]");
    assert_eq!(builder.readable_sentence(), "cancer in Title");

    builder.update_condition(index, ConditionPatch::ExactPhrase(true));
    assert_eq!(builder.serialized_query(), "\"cancer\"[Title]");
    assert_eq!(builder.readable_sentence(), "\"cancer\" in Title");
}

#[test]
fn test_operator_switch_and_identifiers() {
    let mut builder = two_condition_builder();
    assert_eq!(builder.serialized_query(), "a[Title] AND b[Abstract]");

    builder.update_condition(0, ConditionPatch::Operator(BooleanOperator::Or));
    assert_eq!(builder.serialized_query(), "a[Title] OR b[Abstract]");
    assert_eq!(builder.readable_sentence(), "a in Title or b in Abstract");

    builder.update_condition(0, ConditionPatch::Operator(BooleanOperator::And));
    builder.set_identifier_text("123, 456");
    assert_eq!(
        builder.serialized_query(),
        "(a[Title] AND b[Abstract]) AND (123[PMID] OR 456[PMID])"
    );
    assert_eq!(builder.readable_sentence(), "a in Title and b in Abstract");
}

#[test]
fn test_identifiers_only() {
    let mut builder = QueryBuilder::new();
    builder.set_identifier_text("123, doi:10.1/x , , 456");

    assert_eq!(
        builder.serialized_query(),
        "123[PMID] OR doi:10.1/x[PMID] OR 456[PMID]"
    );
    assert_eq!(builder.readable_sentence(), "");
}

#[test]
fn test_manual_edit_lifecycle() {
    let mut builder = two_condition_builder();

    assert!(builder.begin_manual_edit());
    assert!(builder.is_manual_mode());
    assert_eq!(builder.manual_buffer_text(), Some("a[Title] AND b[Abstract]"));
    assert!(builder.visible_sentence().is_none());

    // Structured edits keep compiling but the buffer stays authoritative
    builder.update_condition(1, ConditionPatch::Keyword("c".to_string()));
    assert_eq!(builder.authoritative_query(), "a[Title] AND b[Abstract]");

    assert!(builder.set_manual_text("a[ti] NOT c[ab"));
    assert!(builder.save_manual_edit());
    assert!(matches!(builder.edit_mode(), EditMode::Structured { .. }));
    assert_eq!(builder.serialized_query(), "a[ti] NOT c[ab");
    assert_eq!(builder.conditions()[1].keyword, "c");

    builder.update_condition(0, ConditionPatch::Keyword("z".to_string()));
    assert_eq!(builder.serialized_query(), "z[Title] AND c[Abstract]");
}

#[test]
fn test_removal_keeps_operators() {
    let mut builder = QueryBuilder::with_conditions(
        vec![
            KeywordCondition::new("a", SearchField::Title).operator(BooleanOperator::Or),
            KeywordCondition::new("b", SearchField::Title).operator(BooleanOperator::And),
            KeywordCondition::new("c", SearchField::Title),
        ],
        "",
    );

    let removed = builder.remove_condition(1).unwrap();
    assert_eq!(removed.keyword, "b");
    assert_eq!(builder.conditions()[0].operator, BooleanOperator::Or);
    assert_eq!(builder.serialized_query(), "a[Title] OR c[Title]");
    assert!(builder.remove_condition(5).is_none());
}

#[test]
fn test_downstream_actions_use_authoritative_text() {
    let mut builder = two_condition_builder();
    let mut clipboard = MemoryClipboard::new();
    let mut opener = RecordingOpener::new();

    builder.begin_manual_edit();
    builder.set_manual_text("x[Title]");

    assert_eq!(
        builder.copy_authoritative_query(&mut clipboard).unwrap(),
        ActionOutcome::Performed
    );
    assert_eq!(clipboard.contents(), Some("x[Title]"));

    builder.open_in_external_search(&mut opener).unwrap();
    assert_eq!(
        opener.opened(),
        ["https://pubmed.ncbi.nlm.nih.gov/?term=x%5BTitle%5D".to_string()]
    );

    builder.set_manual_text("");
    assert_eq!(
        builder.copy_authoritative_query(&mut clipboard).unwrap(),
        ActionOutcome::SkippedEmpty
    );
    assert_eq!(clipboard.writes(), 1);
}

#[test]
fn test_cli_terms_compile() {
    let conditions = parse_terms(
        ["ti:\"gene therapy\"", "or", "mesh:neoplasms", "au:smith"],
        SearchField::TitleAbstract,
    )
    .unwrap();
    let builder = QueryBuilder::with_conditions(conditions, "31452104");

    assert_eq!(
        builder.serialized_query(),
        "(\"gene therapy\"[Title] OR neoplasms[MeSH Terms] AND smith[Author]) AND (31452104[PMID])"
    );
    assert_eq!(
        builder.readable_sentence(),
        "\"gene therapy\" in Title or neoplasms in MeSH Terms and smith in Author"
    );
}

#[test]
fn test_session_script() {
    let mut session = Session::default();
    let script = [
        "add",
        "set 0 keyword asthma",
        "set 0 field mh",
        "add",
        "set 1 keyword children",
        "set 1 exact on",
        "column add",
        "column desc 0 Custom",
    ];
    for line in script {
        assert_eq!(session.execute_line(line).unwrap(), Effect::Updated);
    }

    assert_eq!(
        session.builder().serialized_query(),
        "asthma[MeSH Terms] AND \"children\"[Title/Abstract]"
    );
    assert_eq!(session.columns().label_for("customCol1"), "Custom");

    // A bad line leaves everything untouched
    assert!(session.execute_line("set 0 field nowhere").is_err());
    assert_eq!(
        session.builder().conditions()[0].field,
        Some(SearchField::MeshTerms)
    );
}

#[tokio::test]
async fn test_fetch_with_retry_recovers() {
    let source = MockResultSource::with_delay(Duration::ZERO);
    source.push_failure(FetchError::Network("connection reset".to_string()));
    source.push_failure(FetchError::Timeout);

    let builder = two_condition_builder();
    let request = builder.fetch_request();
    assert_eq!(request.query, "a[Title] AND b[Abstract]");
    assert_eq!(request.conditions.len(), 2);

    let config = RetryConfig::default()
        .max_attempts(3)
        .initial_delay(Duration::from_millis(1));
    let records = with_retry(config, || source.fetch(&request)).await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(source.pending_failures(), 0);
}

#[test]
fn test_fetch_permanent_failure() {
    let source = MockResultSource::with_delay(Duration::ZERO);
    source.push_failure(FetchError::InvalidRequest("bad query".to_string()));

    let request = FetchRequest::from_query("a[Title]");
    let result = tokio_test::block_on(with_retry(RetryConfig::default(), || {
        source.fetch(&request)
    }));

    assert!(matches!(result, Err(FetchError::InvalidRequest(_))));
}

#[test]
fn test_records_render_with_column_labels() {
    let source = MockResultSource::with_delay(Duration::ZERO);
    let records =
        tokio_test::block_on(source.fetch(&FetchRequest::from_query("a[Title]"))).unwrap();

    let columns: ColumnSet = vec![OutputColumn::new("value", "Relevance")]
        .into_iter()
        .collect();
    let rendered = records_table(&records, &columns, 120).to_string();

    assert!(rendered.contains("Relevance"));
    assert!(rendered.contains("Status"));
    assert!(rendered.contains("Result C"));
}
