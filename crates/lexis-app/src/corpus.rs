// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::MAX_CANDIDATES;

/// The word list behind prefix suggestions, kept in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Corpus {
    words: Vec<String>,
}

impl Corpus {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    /// Splits a newline-delimited word list. Blank lines are dropped.
    pub fn parse(text: &str) -> Self {
        let words = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// First `MAX_CANDIDATES` words starting with the lowercased input.
    ///
    /// Whitespace-only input yields nothing. The input itself is not trimmed
    /// before matching, so a trailing space matches no word.
    pub fn suggest(&self, input: &str) -> Vec<String> {
        if input.trim().is_empty() {
            return Vec::new();
        }

        let prefix = input.to_lowercase();
        self.words
            .iter()
            .filter(|word| word.starts_with(&prefix))
            .take(MAX_CANDIDATES)
            .cloned()
            .collect()
    }
}
