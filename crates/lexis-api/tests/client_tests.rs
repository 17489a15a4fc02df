// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use lexis_api::{Client, LookupError};
use lexis_app::{DefinitionSource, LookupOutcome};
use lexis_testkit::{MockDictionary, MockRoutes, SAMPLE_WORDS, sample_corpus_text};
use std::time::Duration;

fn client_for(mock: &MockDictionary) -> Result<Client> {
    Client::new(
        &mock.corpus_url(),
        &mock.definitions_url(),
        Duration::from_secs(2),
    )
}

#[test]
fn fetch_corpus_reads_newline_delimited_words() -> Result<()> {
    let mock = MockDictionary::start(MockRoutes::new().corpus(sample_corpus_text()))?;
    let client = client_for(&mock)?;

    let corpus = client.fetch_corpus()?;
    assert_eq!(corpus.words(), SAMPLE_WORDS);
    assert_eq!(
        corpus.suggest("cat"),
        vec!["cat", "catalog", "cats", "catalyst", "catty"]
    );
    assert_eq!(mock.corpus_fetches(), 1);
    Ok(())
}

#[test]
fn fetch_corpus_reports_server_errors() -> Result<()> {
    let mock = MockDictionary::start(MockRoutes::new().corpus_status(503))?;
    let client = client_for(&mock)?;

    let error = client
        .fetch_corpus()
        .expect_err("503 word list should fail");
    assert!(error.to_string().contains("503"), "got {error}");
    Ok(())
}

#[test]
fn fetch_corpus_rejects_empty_word_list() -> Result<()> {
    let mock = MockDictionary::start(MockRoutes::new().corpus("\n\n"))?;
    let client = client_for(&mock)?;

    let error = client.fetch_corpus().expect_err("empty list should fail");
    assert!(error.to_string().contains("is empty"));
    Ok(())
}

#[test]
fn fetch_corpus_error_for_unreachable_host_is_actionable() -> Result<()> {
    let client = Client::new(
        "http://127.0.0.1:1/words.txt",
        "http://127.0.0.1:1/entries",
        Duration::from_millis(200),
    )?;

    let error = client
        .fetch_corpus()
        .expect_err("unreachable host should fail");
    assert!(error.to_string().contains("cannot reach"));
    Ok(())
}

#[test]
fn lookup_decodes_first_entry() -> Result<()> {
    let mock = MockDictionary::start(MockRoutes::new().found("cat"))?;
    let client = client_for(&mock)?;

    let outcome = client.lookup("cat");
    let record = outcome.record().expect("cat should resolve");
    assert_eq!(record.word, "cat");
    assert_eq!(record.summary_lines(), vec!["(noun) Sample sense of cat."]);
    assert_eq!(mock.looked_up_words(), vec!["cat"]);
    Ok(())
}

#[test]
fn lookup_classifies_not_found_empty_and_server_failures() -> Result<()> {
    let mock = MockDictionary::start(
        MockRoutes::new()
            .not_found("catty")
            .empty("cats")
            .status("catalyst", 500)
            .entry("catalog", 200, "not json"),
    )?;
    let client = client_for(&mock)?;

    assert_eq!(client.lookup("catty"), LookupOutcome::NotFound);
    assert_eq!(client.lookup("cats"), LookupOutcome::Empty);
    assert!(matches!(client.lookup("catalyst"), LookupOutcome::Failed(_)));
    assert!(matches!(client.lookup("catalog"), LookupOutcome::Failed(_)));
    Ok(())
}

#[test]
fn fetch_definitions_surfaces_typed_errors() -> Result<()> {
    let mock = MockDictionary::start(MockRoutes::new().status("catalyst", 502))?;
    let client = client_for(&mock)?;

    match client.fetch_definitions("catalyst") {
        Err(LookupError::Status { status, detail, .. }) => {
            assert_eq!(status, 502);
            assert!(detail.contains("Upstream Error"));
        }
        other => panic!("expected status error, got {other:?}"),
    }

    assert_eq!(
        client.fetch_definitions("unknown"),
        Err(LookupError::NotFound {
            word: "unknown".to_owned(),
        })
    );
    Ok(())
}

#[test]
fn unreachable_definition_api_is_a_fetch_failure() -> Result<()> {
    let client = Client::new(
        "http://127.0.0.1:1/words.txt",
        "http://127.0.0.1:1/entries",
        Duration::from_millis(200),
    )?;

    let outcome = client.lookup("cat");
    assert!(matches!(outcome, LookupOutcome::Failed(_)));
    assert_eq!(
        outcome.batch_error_message("cat"),
        Some("Error fetching definitions for the word: cat".to_owned())
    );
    Ok(())
}
