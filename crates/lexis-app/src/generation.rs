// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Request number stamped on every resolution flow. Zero means "none yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        let value = self.0.saturating_add(1);
        Self(if value == 0 { 1 } else { value })
    }
}

/// Shared "latest generation" cell between the controller and its workers.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    current: Arc<AtomicU64>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Generation {
        Generation(self.current.load(Ordering::Acquire))
    }

    /// Moves the counter forward; older tickets become stale. Never moves back.
    pub fn advance_to(&self, generation: Generation) {
        self.current.fetch_max(generation.get(), Ordering::AcqRel);
    }

    pub fn ticket(&self, generation: Generation) -> GenerationTicket {
        self.advance_to(generation);
        GenerationTicket {
            generation,
            current: Arc::clone(&self.current),
        }
    }
}

/// Held by a worker; tells it whether its flow is still the latest one.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    generation: Generation,
    current: Arc<AtomicU64>,
}

impl GenerationTicket {
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.generation.get()
    }
}
