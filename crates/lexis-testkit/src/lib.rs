// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use lexis_app::{Corpus, Definition, DefinitionRecord, Meaning};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tiny_http::{Header, Response, Server};

pub const CORPUS_PATH: &str = "/words.txt";
pub const ENTRIES_PATH: &str = "/api/v2/entries/en";

pub const SAMPLE_WORDS: [&str; 10] = [
    "aardvark",
    "cat",
    "catalog",
    "cats",
    "catalyst",
    "catty",
    "caterpillar",
    "dog",
    "dogma",
    "zebra",
];

pub fn sample_corpus_text() -> String {
    let mut text = SAMPLE_WORDS.join("\r\n");
    text.push_str("\r\n");
    text
}

pub fn sample_corpus() -> Corpus {
    Corpus::parse(&sample_corpus_text())
}

/// A one-meaning record whose definition text mentions the word.
pub fn sample_record(word: &str) -> DefinitionRecord {
    DefinitionRecord {
        word: word.to_owned(),
        phonetic: None,
        meanings: vec![Meaning {
            part_of_speech: Some("noun".to_owned()),
            definitions: vec![Definition {
                definition: format!("Sample sense of {word}."),
                example: None,
            }],
        }],
    }
}

/// The definition API's JSON for one entry with the given meanings.
pub fn entry_json(word: &str, meanings: &[(&str, Vec<&str>)]) -> String {
    let meanings = meanings
        .iter()
        .map(|(part, definitions)| {
            serde_json::json!({
                "partOfSpeech": part,
                "definitions": definitions
                    .iter()
                    .map(|text| serde_json::json!({ "definition": text, "synonyms": [] }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect::<Vec<_>>();
    serde_json::json!([{ "word": word, "phonetics": [], "meanings": meanings }]).to_string()
}

pub fn not_found_json() -> String {
    serde_json::json!({
        "title": "No Definitions Found",
        "message": "Sorry pal, we couldn't find definitions for the word you were looking for.",
        "resolution": "You can try the search again at later time or head to the web instead.",
    })
    .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Canned {
    status: u16,
    body: String,
    content_type: &'static str,
}

/// Responses served by `MockDictionary`. Unknown words answer 404.
#[derive(Debug, Clone, Default)]
pub struct MockRoutes {
    corpus: Option<Canned>,
    entries: HashMap<String, Canned>,
}

impl MockRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn corpus(mut self, text: impl Into<String>) -> Self {
        self.corpus = Some(Canned {
            status: 200,
            body: text.into(),
            content_type: "text/plain",
        });
        self
    }

    pub fn corpus_status(mut self, status: u16) -> Self {
        self.corpus = Some(Canned {
            status,
            body: "unavailable".to_owned(),
            content_type: "text/plain",
        });
        self
    }

    pub fn found(self, word: &str) -> Self {
        let sense = format!("Sample sense of {word}.");
        let body = entry_json(word, &[("noun", vec![sense.as_str()])]);
        self.entry(word, 200, body)
    }

    pub fn empty(self, word: &str) -> Self {
        self.entry(word, 200, "[]")
    }

    pub fn not_found(self, word: &str) -> Self {
        self.entry(word, 404, not_found_json())
    }

    pub fn status(self, word: &str, status: u16) -> Self {
        self.entry(word, status, r#"{"title":"Upstream Error","message":"try later"}"#)
    }

    pub fn entry(mut self, word: &str, status: u16, body: impl Into<String>) -> Self {
        self.entries.insert(
            word.to_owned(),
            Canned {
                status,
                body: body.into(),
                content_type: "application/json",
            },
        );
        self
    }

    fn respond_to(&self, path: &str) -> Canned {
        if path == CORPUS_PATH {
            return self.corpus.clone().unwrap_or(Canned {
                status: 404,
                body: "not found".to_owned(),
                content_type: "text/plain",
            });
        }

        let word = path
            .strip_prefix(ENTRIES_PATH)
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or_default();
        self.entries.get(word).cloned().unwrap_or(Canned {
            status: 404,
            body: not_found_json(),
            content_type: "application/json",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub at: Instant,
}

/// Local HTTP server standing in for both the word list and the definition API.
pub struct MockDictionary {
    base_url: String,
    server: Arc<Server>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl MockDictionary {
    pub fn start(routes: MockRoutes) -> Result<Self> {
        let server = Server::http("127.0.0.1:0")
            .map_err(|error| anyhow!("start mock server: {error}"))?;
        let server = Arc::new(server);
        let base_url = format!("http://{}", server.server_addr());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            thread::spawn(move || {
                for request in server.incoming_requests() {
                    let path = request.url().to_owned();
                    requests
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(RecordedRequest {
                            path: path.clone(),
                            at: Instant::now(),
                        });

                    let canned = routes.respond_to(&path);
                    let mut response =
                        Response::from_string(canned.body).with_status_code(canned.status);
                    if let Ok(header) = Header::from_bytes("Content-Type", canned.content_type) {
                        response = response.with_header(header);
                    }
                    let _ = request.respond(response);
                }
            })
        };

        Ok(Self {
            base_url,
            server,
            requests,
            handle: Some(handle),
        })
    }

    pub fn corpus_url(&self) -> String {
        format!("{}{CORPUS_PATH}", self.base_url)
    }

    pub fn definitions_url(&self) -> String {
        format!("{}{ENTRIES_PATH}", self.base_url)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Words requested from the definition API, in arrival order.
    pub fn looked_up_words(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|request| {
                request
                    .path
                    .strip_prefix(ENTRIES_PATH)
                    .map(|rest| rest.trim_start_matches('/').to_owned())
            })
            .collect()
    }

    pub fn corpus_fetches(&self) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.path == CORPUS_PATH)
            .count()
    }
}

impl Drop for MockDictionary {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
