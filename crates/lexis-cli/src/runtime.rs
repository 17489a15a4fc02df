// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use lexis_api::Client;
use lexis_app::{
    BatchEnd, Corpus, DefinitionSource, Generation, GenerationCounter, LookupOutcome, Throttle,
    resolve_batch,
};
use lexis_tui::{InternalEvent, LookupRuntime, WorkerEvent, send_worker_event};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Runs lookups against the dictionary service on worker threads.
pub struct ApiRuntime {
    client: Client,
    generations: GenerationCounter,
    throttle: Duration,
}

impl ApiRuntime {
    pub fn new(client: Client, throttle: Duration) -> Self {
        Self {
            client,
            generations: GenerationCounter::new(),
            throttle,
        }
    }
}

impl LookupRuntime for ApiRuntime {
    fn load_corpus(&mut self) -> Result<Corpus> {
        self.client.fetch_corpus()
    }

    fn lookup(&mut self, word: &str) -> LookupOutcome {
        self.client.lookup(word)
    }

    fn spawn_corpus_load(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name("lexis-corpus".to_owned())
            .spawn(move || {
                let event = match client.fetch_corpus() {
                    Ok(corpus) => WorkerEvent::CorpusLoaded(Arc::new(corpus)),
                    Err(error) => WorkerEvent::CorpusFailed(format!("{error:#}")),
                };
                let _ = send_worker_event(&tx, event);
            })
            .context("spawn word list loader")?;
        Ok(())
    }

    fn spawn_single_lookup(
        &mut self,
        generation: Generation,
        word: &str,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let ticket = self.generations.ticket(generation);
        let client = self.client.clone();
        let word = word.to_owned();
        thread::Builder::new()
            .name("lexis-lookup".to_owned())
            .spawn(move || {
                let outcome = client.lookup(&word);
                if !ticket.is_current() {
                    debug!(generation = generation.get(), %word, "dropping superseded lookup");
                    return;
                }
                let _ = send_worker_event(
                    &tx,
                    WorkerEvent::SingleResolved {
                        generation,
                        outcome,
                    },
                );
            })
            .context("spawn definition lookup")?;
        Ok(())
    }

    fn spawn_batch_lookup(
        &mut self,
        generation: Generation,
        words: &[String],
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let ticket = self.generations.ticket(generation);
        let client = self.client.clone();
        let words = words.to_vec();
        let mut throttle = Throttle::new(self.throttle);
        thread::Builder::new()
            .name("lexis-batch".to_owned())
            .spawn(move || {
                let end = resolve_batch(&client, &words, &mut throttle, &ticket, |word, outcome| {
                    let _ = send_worker_event(
                        &tx,
                        WorkerEvent::BatchWord {
                            generation,
                            word: word.to_owned(),
                            outcome,
                        },
                    );
                });
                if end == BatchEnd::Completed {
                    let _ = send_worker_event(&tx, WorkerEvent::BatchFinished { generation });
                }
            })
            .context("spawn batch lookup")?;
        Ok(())
    }

    fn cancel_lookups(&mut self, stale: Generation) -> Result<()> {
        info!(generation = stale.get(), "lookups canceled");
        self.generations.advance_to(stale.next());
        Ok(())
    }
}
