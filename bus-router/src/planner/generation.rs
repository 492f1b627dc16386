//! Generation tokens for superseding in-flight searches.
//!
//! A search is never cancelled. Instead, each search is started under a
//! fresh generation, and a result is only used if its generation is still
//! the latest one issued when it arrives.

use std::sync::atomic::{AtomicU64, Ordering};

/// Token identifying one search invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing generations.
#[derive(Debug, Default)]
pub struct SearchGenerations {
    latest: AtomicU64,
}

impl SearchGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new search, superseding every earlier generation.
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `generation` is the most recently issued one.
    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    /// Tag a result with the generation that produced it.
    pub fn tag<T>(&self, generation: Generation, value: T) -> Tagged<T> {
        Tagged { generation, value }
    }
}

/// A search result tagged with its generation.
#[derive(Debug, Clone)]
pub struct Tagged<T> {
    pub generation: Generation,
    pub value: T,
}

impl<T> Tagged<T> {
    /// The value, or `None` if a newer search has begun since.
    pub fn into_current(self, generations: &SearchGenerations) -> Option<T> {
        generations
            .is_current(self.generation)
            .then_some(self.value)
    }
}
