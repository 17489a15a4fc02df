// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{DefinitionRecord, GenerationTicket, LookupOutcome, MAX_CANDIDATES, Throttle};
use tracing::debug;

/// Anything that can answer a definition lookup for one word.
pub trait DefinitionSource {
    fn lookup(&self, word: &str) -> LookupOutcome;
}

impl<T: DefinitionSource + ?Sized> DefinitionSource for &T {
    fn lookup(&self, word: &str) -> LookupOutcome {
        (**self).lookup(word)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchEnd {
    Completed,
    Superseded,
}

/// Looks up `words` one at a time, spaced by `throttle`.
///
/// `on_word` sees each outcome as soon as it lands. The ticket is checked
/// before every lookup; a superseded batch stops without issuing more calls.
pub fn resolve_batch<S, F>(
    source: &S,
    words: &[String],
    throttle: &mut Throttle,
    ticket: &GenerationTicket,
    mut on_word: F,
) -> BatchEnd
where
    S: DefinitionSource + ?Sized,
    F: FnMut(&str, LookupOutcome),
{
    for word in words {
        throttle.wait();
        if !ticket.is_current() {
            debug!(
                generation = ticket.generation().get(),
                word = %word,
                "batch superseded; stopping"
            );
            return BatchEnd::Superseded;
        }

        let outcome = source.lookup(word);
        debug!(
            generation = ticket.generation().get(),
            word = %word,
            outcome = outcome.label(),
            "batch lookup finished"
        );
        on_word(word, outcome);
    }
    BatchEnd::Completed
}

/// Running totals of one batch commit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchTally {
    pub definitions: Vec<DefinitionRecord>,
    pub confirmed: Vec<String>,
    pub errors: Vec<String>,
}

impl BatchTally {
    pub fn record(&mut self, word: &str, outcome: LookupOutcome) {
        if let Some(message) = outcome.batch_error_message(word) {
            self.errors.push(message);
            return;
        }
        if let LookupOutcome::Found(record) = outcome {
            self.definitions.push(record);
            self.confirmed.push(word.to_owned());
        }
    }

    /// Confirmed words as the next candidate list.
    pub fn confirmed_candidates(&self) -> Vec<String> {
        self.confirmed.iter().take(MAX_CANDIDATES).cloned().collect()
    }
}
