// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{BatchTally, Corpus, DefinitionRecord, Generation, LookupOutcome};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorpusStatus {
    #[default]
    Missing,
    Loading,
    Ready(Arc<Corpus>),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    SingleLookup {
        word: String,
    },
    BatchResolving {
        words: Vec<String>,
        tally: BatchTally,
    },
}

impl Phase {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SingleLookup { .. } => "lookup",
            Self::BatchResolving { .. } => "batch",
        }
    }
}

/// Everything the view shows, owned by the controller and changed only
/// through `dispatch`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LookupState {
    pub input: String,
    pub candidates: Vec<String>,
    pub selected: Option<String>,
    pub definitions: Vec<DefinitionRecord>,
    pub errors: Vec<String>,
    pub phase: Phase,
    pub generation: Generation,
    pub corpus: CorpusStatus,
    pub status_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupCommand {
    SetInput(String),
    SelectWord(String),
    Commit,
    Cancel,
    CorpusLoaded(Arc<Corpus>),
    CorpusFailed(String),
    SingleResolved {
        generation: Generation,
        outcome: LookupOutcome,
    },
    BatchWordResolved {
        generation: Generation,
        word: String,
        outcome: LookupOutcome,
    },
    BatchFinished {
        generation: Generation,
    },
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupEvent {
    InputChanged(String),
    CandidatesChanged(Vec<String>),
    DefinitionsChanged(usize),
    ErrorsChanged(Vec<String>),
    CorpusRequested,
    CorpusReady(usize),
    CorpusUnavailable(String),
    SingleLookupRequested {
        generation: Generation,
        word: String,
    },
    BatchLookupRequested {
        generation: Generation,
        words: Vec<String>,
    },
    Cancelled(Generation),
    StaleDiscarded(Generation),
    FlowFinished(Generation),
    StatusUpdated(String),
    StatusCleared,
}

impl LookupState {
    pub fn dispatch(&mut self, command: LookupCommand) -> Vec<LookupEvent> {
        match command {
            LookupCommand::SetInput(input) => self.set_input(input),
            LookupCommand::SelectWord(word) => self.select_word(word),
            LookupCommand::Commit => self.commit(),
            LookupCommand::Cancel => {
                let mut events = self.supersede_in_flight();
                if !events.is_empty() {
                    events.push(self.set_status("lookup canceled"));
                }
                events
            }
            LookupCommand::CorpusLoaded(corpus) => self.corpus_loaded(corpus),
            LookupCommand::CorpusFailed(reason) => {
                warn!(%reason, "word list unavailable; suggestions disabled");
                self.corpus = CorpusStatus::Failed;
                vec![LookupEvent::CorpusUnavailable(reason)]
            }
            LookupCommand::SingleResolved {
                generation,
                outcome,
            } => self.single_resolved(generation, outcome),
            LookupCommand::BatchWordResolved {
                generation,
                word,
                outcome,
            } => self.batch_word_resolved(generation, &word, outcome),
            LookupCommand::BatchFinished { generation } => self.batch_finished(generation),
            LookupCommand::SetStatus(message) => vec![self.set_status(&message)],
            LookupCommand::ClearStatus => {
                self.status_line = None;
                vec![LookupEvent::StatusCleared]
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// The error panel only shows while there is something in the input.
    pub fn errors_visible(&self) -> bool {
        !self.input.trim().is_empty()
    }

    /// A selected word whose lookup came back with nothing.
    pub fn selection_missing_definition(&self) -> bool {
        self.selected.is_some() && self.definitions.is_empty() && !self.is_busy()
    }

    fn set_input(&mut self, input: String) -> Vec<LookupEvent> {
        if input == self.input {
            return Vec::new();
        }

        let mut events = self.supersede_in_flight();
        self.input = input;
        self.selected = None;
        self.definitions.clear();
        self.errors.clear();
        events.push(LookupEvent::InputChanged(self.input.clone()));

        let needs_corpus = matches!(self.corpus, CorpusStatus::Missing | CorpusStatus::Failed)
            && !self.input.trim().is_empty();
        if needs_corpus {
            self.corpus = CorpusStatus::Loading;
            events.push(LookupEvent::CorpusRequested);
        }

        self.candidates = match &self.corpus {
            CorpusStatus::Ready(corpus) => corpus.suggest(&self.input),
            _ => Vec::new(),
        };
        events.push(LookupEvent::CandidatesChanged(self.candidates.clone()));
        events
    }

    fn select_word(&mut self, word: String) -> Vec<LookupEvent> {
        let mut events = self.supersede_in_flight();
        self.generation = self.generation.next();
        self.selected = Some(word.clone());
        self.candidates.clear();
        self.definitions.clear();
        self.errors.clear();
        self.phase = Phase::SingleLookup { word: word.clone() };
        info!(generation = self.generation.get(), %word, "single lookup started");

        events.push(LookupEvent::CandidatesChanged(Vec::new()));
        events.push(LookupEvent::ErrorsChanged(Vec::new()));
        events.push(LookupEvent::SingleLookupRequested {
            generation: self.generation,
            word,
        });
        events
    }

    fn commit(&mut self) -> Vec<LookupEvent> {
        if self.input.trim().is_empty() {
            self.errors.clear();
            return vec![LookupEvent::ErrorsChanged(Vec::new())];
        }

        let mut events = self.supersede_in_flight();
        self.generation = self.generation.next();
        let words = self.candidates.clone();
        info!(
            generation = self.generation.get(),
            count = words.len(),
            "batch lookup started"
        );

        if words.is_empty() {
            self.candidates.clear();
            self.errors.clear();
            events.push(LookupEvent::CandidatesChanged(Vec::new()));
            events.push(LookupEvent::ErrorsChanged(Vec::new()));
            events.push(LookupEvent::FlowFinished(self.generation));
            return events;
        }

        // Only a non-empty queue replaces what is shown.
        self.definitions.clear();
        self.phase = Phase::BatchResolving {
            words: words.clone(),
            tally: BatchTally::default(),
        };
        events.push(LookupEvent::DefinitionsChanged(0));
        events.push(LookupEvent::BatchLookupRequested {
            generation: self.generation,
            words,
        });
        events
    }

    fn corpus_loaded(&mut self, corpus: Arc<Corpus>) -> Vec<LookupEvent> {
        info!(words = corpus.len(), "word list loaded");
        let size = corpus.len();
        let mut events = vec![LookupEvent::CorpusReady(size)];

        if !self.is_busy() && self.selected.is_none() {
            self.candidates = corpus.suggest(&self.input);
            events.push(LookupEvent::CandidatesChanged(self.candidates.clone()));
        }
        self.corpus = CorpusStatus::Ready(corpus);
        events
    }

    fn single_resolved(
        &mut self,
        generation: Generation,
        outcome: LookupOutcome,
    ) -> Vec<LookupEvent> {
        if generation != self.generation || !matches!(self.phase, Phase::SingleLookup { .. }) {
            return vec![self.discard_stale(generation)];
        }

        if let LookupOutcome::Failed(reason) = &outcome {
            debug!(generation = generation.get(), %reason, "single lookup failed");
        }
        self.definitions = outcome.record().cloned().into_iter().collect();
        self.phase = Phase::Idle;
        vec![
            LookupEvent::DefinitionsChanged(self.definitions.len()),
            LookupEvent::FlowFinished(generation),
        ]
    }

    fn batch_word_resolved(
        &mut self,
        generation: Generation,
        word: &str,
        outcome: LookupOutcome,
    ) -> Vec<LookupEvent> {
        if !self.is_current_batch(generation) {
            return vec![self.discard_stale(generation)];
        }

        if let Some(record) = outcome.record() {
            self.definitions.push(record.clone());
        }
        if let Phase::BatchResolving { tally, .. } = &mut self.phase {
            tally.record(word, outcome);
        }
        vec![LookupEvent::DefinitionsChanged(self.definitions.len())]
    }

    fn batch_finished(&mut self, generation: Generation) -> Vec<LookupEvent> {
        if !self.is_current_batch(generation) {
            return vec![self.discard_stale(generation)];
        }
        let Phase::BatchResolving { tally, .. } = std::mem::take(&mut self.phase) else {
            return Vec::new();
        };

        self.candidates = tally.confirmed_candidates();
        self.errors = tally.errors;
        info!(
            generation = generation.get(),
            confirmed = self.candidates.len(),
            errors = self.errors.len(),
            "batch lookup finished"
        );
        vec![
            LookupEvent::CandidatesChanged(self.candidates.clone()),
            LookupEvent::ErrorsChanged(self.errors.clone()),
            LookupEvent::FlowFinished(generation),
        ]
    }

    fn is_current_batch(&self, generation: Generation) -> bool {
        generation == self.generation && matches!(self.phase, Phase::BatchResolving { .. })
    }

    fn supersede_in_flight(&mut self) -> Vec<LookupEvent> {
        if !self.is_busy() {
            return Vec::new();
        }

        let stale = self.generation;
        debug!(generation = stale.get(), phase = self.phase.label(), "superseding lookup");
        self.phase = Phase::Idle;
        self.generation = self.generation.next();
        vec![LookupEvent::Cancelled(stale)]
    }

    fn discard_stale(&self, generation: Generation) -> LookupEvent {
        debug!(
            generation = generation.get(),
            current = self.generation.get(),
            "discarding stale completion"
        );
        LookupEvent::StaleDiscarded(generation)
    }

    fn set_status(&mut self, message: &str) -> LookupEvent {
        self.status_line = Some(message.to_owned());
        LookupEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{CorpusStatus, LookupCommand, LookupEvent, LookupState, Phase};
    use crate::{Corpus, DefinitionRecord, Generation, LookupOutcome};
    use std::sync::Arc;

    fn cat_corpus() -> Arc<Corpus> {
        Arc::new(Corpus::parse(
            "cat\ncatalog\ncats\ncatalyst\ncatty\ncaterpillar\n",
        ))
    }

    fn ready_state() -> LookupState {
        LookupState {
            corpus: CorpusStatus::Ready(cat_corpus()),
            ..LookupState::default()
        }
    }

    fn found(word: &str) -> LookupOutcome {
        LookupOutcome::Found(DefinitionRecord {
            word: word.to_owned(),
            phonetic: None,
            meanings: Vec::new(),
        })
    }

    fn requested_batch(events: &[LookupEvent]) -> Option<(Generation, Vec<String>)> {
        events.iter().find_map(|event| match event {
            LookupEvent::BatchLookupRequested { generation, words } => {
                Some((*generation, words.clone()))
            }
            _ => None,
        })
    }

    fn requested_single(events: &[LookupEvent]) -> Option<(Generation, String)> {
        events.iter().find_map(|event| match event {
            LookupEvent::SingleLookupRequested { generation, word } => {
                Some((*generation, word.clone()))
            }
            _ => None,
        })
    }

    #[test]
    fn whitespace_input_clears_candidates() {
        let mut state = ready_state();
        state.dispatch(LookupCommand::SetInput("cat".to_owned()));
        assert_eq!(state.candidates.len(), 5);

        let events = state.dispatch(LookupCommand::SetInput("   ".to_owned()));
        assert!(state.candidates.is_empty());
        assert!(events.contains(&LookupEvent::CandidatesChanged(Vec::new())));
    }

    #[test]
    fn input_change_recomputes_first_five_matches() {
        let mut state = ready_state();
        state.dispatch(LookupCommand::SetInput("cat".to_owned()));
        assert_eq!(
            state.candidates,
            vec!["cat", "catalog", "cats", "catalyst", "catty"]
        );
    }

    #[test]
    fn unchanged_input_is_a_no_op() {
        let mut state = ready_state();
        state.dispatch(LookupCommand::SetInput("cat".to_owned()));
        assert!(state.dispatch(LookupCommand::SetInput("cat".to_owned())).is_empty());
    }

    #[test]
    fn first_input_requests_the_word_list_once() {
        let mut state = LookupState::default();
        let events = state.dispatch(LookupCommand::SetInput("c".to_owned()));
        assert!(events.contains(&LookupEvent::CorpusRequested));
        assert_eq!(state.corpus, CorpusStatus::Loading);

        let events = state.dispatch(LookupCommand::SetInput("ca".to_owned()));
        assert!(!events.contains(&LookupEvent::CorpusRequested));
        assert!(state.candidates.is_empty());
    }

    #[test]
    fn blank_input_does_not_request_the_word_list() {
        let mut state = LookupState::default();
        let events = state.dispatch(LookupCommand::SetInput(" ".to_owned()));
        assert!(!events.contains(&LookupEvent::CorpusRequested));
        assert_eq!(state.corpus, CorpusStatus::Missing);
    }

    #[test]
    fn late_word_list_fills_candidates_for_current_input() {
        let mut state = LookupState::default();
        state.dispatch(LookupCommand::SetInput("cata".to_owned()));

        let events = state.dispatch(LookupCommand::CorpusLoaded(cat_corpus()));
        assert!(events.contains(&LookupEvent::CorpusReady(6)));
        assert_eq!(state.candidates, vec!["catalog", "catalyst"]);
    }

    #[test]
    fn failed_word_list_degrades_silently_and_retries_on_next_input() {
        let mut state = LookupState::default();
        state.dispatch(LookupCommand::SetInput("c".to_owned()));
        state.dispatch(LookupCommand::CorpusFailed("offline".to_owned()));
        assert_eq!(state.corpus, CorpusStatus::Failed);
        assert!(state.errors.is_empty());
        assert!(state.candidates.is_empty());

        let events = state.dispatch(LookupCommand::SetInput("ca".to_owned()));
        assert!(events.contains(&LookupEvent::CorpusRequested));
    }

    #[test]
    fn selecting_clears_candidates_and_errors_before_lookup_resolves() {
        let mut state = ready_state();
        state.dispatch(LookupCommand::SetInput("cat".to_owned()));
        state.errors = vec!["old".to_owned()];

        let events = state.dispatch(LookupCommand::SelectWord("catalog".to_owned()));
        assert!(state.candidates.is_empty());
        assert!(state.errors.is_empty());
        assert!(state.definitions.is_empty());
        assert_eq!(state.selected.as_deref(), Some("catalog"));
        assert!(state.is_busy());
        assert_eq!(
            requested_single(&events).map(|(_, word)| word),
            Some("catalog".to_owned())
        );
    }

    #[test]
    fn single_lookup_keeps_first_entry_on_success() {
        let mut state = ready_state();
        state.dispatch(LookupCommand::SetInput("cat".to_owned()));
        let events = state.dispatch(LookupCommand::SelectWord("cat".to_owned()));
        let (generation, _) = requested_single(&events).expect("single lookup requested");

        state.dispatch(LookupCommand::SingleResolved {
            generation,
            outcome: found("cat"),
        });
        assert_eq!(state.definitions.len(), 1);
        assert_eq!(state.definitions[0].word, "cat");
        assert_eq!(state.phase, Phase::Idle);
    }

    #[test]
    fn single_lookup_failure_never_touches_errors() {
        let mut state = ready_state();
        state.dispatch(LookupCommand::SetInput("cat".to_owned()));
        let events = state.dispatch(LookupCommand::SelectWord("catty".to_owned()));
        let (generation, _) = requested_single(&events).expect("single lookup requested");

        for outcome in [
            LookupOutcome::NotFound,
            LookupOutcome::Failed("status 500".to_owned()),
        ] {
            state.phase = Phase::SingleLookup {
                word: "catty".to_owned(),
            };
            state.dispatch(LookupCommand::SingleResolved {
                generation,
                outcome,
            });
            assert!(state.errors.is_empty());
            assert!(state.definitions.is_empty());
            assert!(state.selection_missing_definition());
        }
    }

    #[test]
    fn batch_commit_queues_candidates_and_replaces_lists_at_end() {
        let mut state = ready_state();
        state.dispatch(LookupCommand::SetInput("cat".to_owned()));
        let events = state.dispatch(LookupCommand::Commit);
        let (generation, words) = requested_batch(&events).expect("batch requested");
        assert_eq!(words, vec!["cat", "catalog", "cats", "catalyst", "catty"]);

        let outcomes = [
            ("cat", found("cat")),
            ("catalog", found("catalog")),
            ("cats", LookupOutcome::Empty),
            ("catalyst", LookupOutcome::Failed("status 503".to_owned())),
            ("catty", LookupOutcome::NotFound),
        ];
        for (word, outcome) in outcomes {
            state.dispatch(LookupCommand::BatchWordResolved {
                generation,
                word: word.to_owned(),
                outcome,
            });
        }
        // Definitions show as they arrive; candidates and errors wait for the end.
        assert_eq!(state.definitions.len(), 2);
        assert_eq!(state.candidates.len(), 5);
        assert!(state.errors.is_empty());

        state.dispatch(LookupCommand::BatchFinished { generation });
        assert_eq!(state.candidates, vec!["cat", "catalog"]);
        assert_eq!(
            state.errors,
            vec![
                "No definitions found for the word: cats",
                "Error fetching definitions for the word: catalyst",
                "No definitions found for the word: catty",
            ]
        );
        assert_eq!(state.phase, Phase::Idle);
    }

    #[test]
    fn commit_with_blank_input_only_clears_errors() {
        let mut state = ready_state();
        state.errors = vec!["stale".to_owned()];
        state.input = "  ".to_owned();

        let events = state.dispatch(LookupCommand::Commit);
        assert_eq!(events, vec![LookupEvent::ErrorsChanged(Vec::new())]);
        assert!(state.errors.is_empty());
        assert!(!state.is_busy());
    }

    #[test]
    fn commit_without_candidates_finishes_immediately() {
        let mut state = ready_state();
        state.dispatch(LookupCommand::SetInput("zzz".to_owned()));
        let events = state.dispatch(LookupCommand::Commit);
        assert!(requested_batch(&events).is_none());
        assert!(!state.is_busy());
        assert!(state.candidates.is_empty());
    }

    #[test]
    fn enter_after_resolved_selection_keeps_its_definition() {
        let mut state = ready_state();
        state.dispatch(LookupCommand::SetInput("cat".to_owned()));
        let events = state.dispatch(LookupCommand::SelectWord("catalog".to_owned()));
        let (generation, _) = requested_single(&events).expect("single lookup requested");
        state.dispatch(LookupCommand::SingleResolved {
            generation,
            outcome: found("catalog"),
        });

        let events = state.dispatch(LookupCommand::Commit);
        assert!(requested_batch(&events).is_none());
        assert_eq!(state.definitions.len(), 1);
        assert_eq!(state.definitions[0].word, "catalog");
        assert!(!state.selection_missing_definition());
        assert!(!events.contains(&LookupEvent::DefinitionsChanged(0)));
    }

    #[test]
    fn batch_start_clears_previous_definitions() {
        let mut state = ready_state();
        state.dispatch(LookupCommand::SetInput("cat".to_owned()));
        state.definitions = vec![DefinitionRecord {
            word: "old".to_owned(),
            phonetic: None,
            meanings: Vec::new(),
        }];

        let events = state.dispatch(LookupCommand::Commit);
        assert!(requested_batch(&events).is_some());
        assert!(state.definitions.is_empty());
    }

    #[test]
    fn input_change_cancels_batch_and_discards_late_results() {
        let mut state = ready_state();
        state.dispatch(LookupCommand::SetInput("cat".to_owned()));
        let events = state.dispatch(LookupCommand::Commit);
        let (generation, _) = requested_batch(&events).expect("batch requested");

        let events = state.dispatch(LookupCommand::SetInput("cata".to_owned()));
        assert!(events.contains(&LookupEvent::Cancelled(generation)));
        assert!(!state.is_busy());

        let late = state.dispatch(LookupCommand::BatchWordResolved {
            generation,
            word: "cat".to_owned(),
            outcome: found("cat"),
        });
        assert_eq!(late, vec![LookupEvent::StaleDiscarded(generation)]);
        let late = state.dispatch(LookupCommand::BatchFinished { generation });
        assert_eq!(late, vec![LookupEvent::StaleDiscarded(generation)]);

        assert!(state.definitions.is_empty());
        assert_eq!(state.candidates, vec!["catalog", "catalyst"]);
    }

    #[test]
    fn stale_single_result_is_discarded_after_new_selection() {
        let mut state = ready_state();
        state.dispatch(LookupCommand::SetInput("cat".to_owned()));
        let first = state.dispatch(LookupCommand::SelectWord("cat".to_owned()));
        let (old, _) = requested_single(&first).expect("first lookup");
        let second = state.dispatch(LookupCommand::SelectWord("cats".to_owned()));
        let (new, _) = requested_single(&second).expect("second lookup");
        assert!(new > old);
        assert!(second.contains(&LookupEvent::Cancelled(old)));

        let events = state.dispatch(LookupCommand::SingleResolved {
            generation: old,
            outcome: found("cat"),
        });
        assert_eq!(events, vec![LookupEvent::StaleDiscarded(old)]);
        assert!(state.definitions.is_empty());
        assert!(state.is_busy());
    }

    #[test]
    fn cancel_stops_in_flight_flow_and_reports_status() {
        let mut state = ready_state();
        state.dispatch(LookupCommand::SetInput("cat".to_owned()));
        let events = state.dispatch(LookupCommand::Commit);
        let (generation, _) = requested_batch(&events).expect("batch requested");

        let events = state.dispatch(LookupCommand::Cancel);
        assert_eq!(
            events,
            vec![
                LookupEvent::Cancelled(generation),
                LookupEvent::StatusUpdated("lookup canceled".to_owned()),
            ]
        );
        assert!(state.dispatch(LookupCommand::Cancel).is_empty());
    }

    #[test]
    fn errors_hidden_while_input_blank() {
        let mut state = ready_state();
        assert!(!state.errors_visible());
        state.dispatch(LookupCommand::SetInput("c".to_owned()));
        assert!(state.errors_visible());
    }

    #[test]
    fn status_set_and_clear() {
        let mut state = LookupState::default();
        state.dispatch(LookupCommand::SetStatus("hello".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("hello"));
        assert_eq!(
            state.dispatch(LookupCommand::ClearStatus),
            vec![LookupEvent::StatusCleared]
        );
        assert!(state.status_line.is_none());
    }
}
