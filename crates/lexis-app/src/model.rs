// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

/// Upper bound on the candidate list at every point in the flow.
pub const MAX_CANDIDATES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

impl Meaning {
    /// Only the first definition of a meaning group is ever shown.
    pub fn first_definition(&self) -> Option<&str> {
        self.definitions
            .first()
            .map(|definition| definition.definition.as_str())
    }
}

/// One resolved dictionary entry, decoded straight from the definition API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionRecord {
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
}

impl DefinitionRecord {
    pub fn headline(&self) -> String {
        match self.phonetic.as_deref().map(str::trim) {
            Some(phonetic) if !phonetic.is_empty() => format!("{} {phonetic}", self.word),
            _ => self.word.clone(),
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.meanings
            .iter()
            .filter_map(|meaning| {
                let text = meaning.first_definition()?;
                Some(match meaning.part_of_speech.as_deref() {
                    Some(part) if !part.is_empty() => format!("({part}) {text}"),
                    _ => text.to_owned(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(DefinitionRecord),
    Empty,
    NotFound,
    Failed(String),
}

impl LookupOutcome {
    /// Picks the first entry of an API answer, or `Empty` when there is none.
    pub fn from_entries(entries: Vec<DefinitionRecord>) -> Self {
        match entries.into_iter().next() {
            Some(record) => Self::Found(record),
            None => Self::Empty,
        }
    }

    pub fn record(&self) -> Option<&DefinitionRecord> {
        match self {
            Self::Found(record) => Some(record),
            Self::Empty | Self::NotFound | Self::Failed(_) => None,
        }
    }

    /// Error-panel text for a batch word; `None` when the lookup succeeded.
    pub fn batch_error_message(&self, word: &str) -> Option<String> {
        match self {
            Self::Found(_) => None,
            Self::Empty | Self::NotFound => Some(not_found_message(word)),
            Self::Failed(_) => Some(fetch_error_message(word)),
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::Empty => "empty",
            Self::NotFound => "not found",
            Self::Failed(_) => "failed",
        }
    }
}

pub fn not_found_message(word: &str) -> String {
    format!("No definitions found for the word: {word}")
}

pub fn fetch_error_message(word: &str) -> String {
    format!("Error fetching definitions for the word: {word}")
}
