//! Basic usage example for the Research Query library.
//!
//! Builds a query from structured conditions, overrides it by hand, then
//! fetches mock results and prints them as a table.

use research_query::models::{BooleanOperator, ColumnSet, ConditionPatch, SearchField};
use research_query::query::QueryBuilder;
use research_query::sources::{MockResultSource, ResultSource};
use research_query::utils::{records_table, terminal_width, with_retry, RetryConfig};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = QueryBuilder::new();

    // Two conditions joined by OR
    let first = builder.add_condition();
    builder.update_condition(first, ConditionPatch::Keyword("gene therapy".into()));
    builder.update_condition(first, ConditionPatch::Field(Some(SearchField::Title)));
    builder.update_condition(first, ConditionPatch::ExactPhrase(true));
    builder.update_condition(first, ConditionPatch::Operator(BooleanOperator::Or));

    let second = builder.add_condition();
    builder.update_condition(second, ConditionPatch::Keyword("CRISPR".into()));
    builder.update_condition(second, ConditionPatch::Field(Some(SearchField::MeshTerms)));

    builder.set_identifier_text("31452104, 29301891");

    println!("Query:    {}", builder.serialized_query());
    if let Some(sentence) = builder.visible_sentence() {
        println!("Sentence: {}", sentence);
    }
    if let Some(url) = builder.external_search_url() {
        println!("URL:      {}", url);
    }

    // Hand-edit the query; the conditions stay as they were
    builder.begin_manual_edit();
    builder.set_manual_text(format!("{} AND 2020:2024[dp]", builder.serialized_query()));
    builder.save_manual_edit();
    println!("\nEdited:   {}", builder.authoritative_query());

    // Fetch mock results for the edited query
    let source = MockResultSource::with_delay(Duration::from_millis(200));
    let request = builder.fetch_request();
    let records = with_retry(RetryConfig::default(), || source.fetch(&request)).await?;

    let mut columns = ColumnSet::new();
    columns.add();
    columns.set_key(0, "value");
    columns.set_description(0, "Relevance");

    println!("\n{} results from {}:", records.len(), source.name());
    println!("{}", records_table(&records, &columns, terminal_width()));

    Ok(())
}
