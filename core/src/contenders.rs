//! Top-K Contender Registry (component F).
//!
//! Tracks the best `desired_contenders` candidates seen by a search driver,
//! ranked by aggregate score, with a deterministic tie-break so the same
//! search run always produces the same ordering regardless of thread
//! scheduling.

use std::path::Path;

use ordered_float::NotNan;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::persistence::{atomic_write_json, read_json};
use crate::sequence::Sequence;

/// One scored candidate: its sequence, aggregate score, and the order it
/// was discovered in (the tie-break key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contender {
    /// The sequence that produced this score.
    pub sequence: Sequence,
    /// Aggregate score from the cryptanalysis engine.
    pub score: f64,
    /// Monotonic discovery order, assigned by [`ContenderRegistry::consider`].
    /// Lower wins ties: the first search driver to find an equally-good
    /// sequence keeps its slot.
    pub created_at_sequence: u64,
}

impl Contender {
    /// NaN scores (never produced by `analysis::aggregate_score`, but not
    /// ruled out by `f64`'s type) sort as the worst possible entry rather
    /// than panicking the comparator.
    fn ordering_key(&self) -> (NotNan<f64>, std::cmp::Reverse<u64>) {
        let score = NotNan::new(self.score).unwrap_or_default();
        (score, std::cmp::Reverse(self.created_at_sequence))
    }
}

struct Inner {
    capacity: usize,
    next_sequence: u64,
    entries: Vec<Contender>,
}

/// Thread-safe top-K registry. Shared across search-driver worker threads
/// via `Arc<ContenderRegistry>`.
pub struct ContenderRegistry {
    inner: Mutex<Inner>,
}

impl ContenderRegistry {
    /// Create a registry that retains at most `capacity` contenders.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { inner: Mutex::new(Inner { capacity, next_sequence: 0, entries: Vec::new() }) }
    }

    /// Offer a newly scored sequence. Inserted only if the registry has
    /// room or the new score beats the current worst kept entry; the worst
    /// entry is evicted to make room when at capacity.
    pub fn consider(&self, sequence: Sequence, score: f64) {
        let mut inner = self.inner.lock();
        let created_at_sequence = inner.next_sequence;
        inner.next_sequence += 1;
        let capacity = inner.capacity;
        let candidate = Contender { sequence, score, created_at_sequence };

        if inner.entries.len() < capacity {
            inner.entries.push(candidate);
            inner.entries.sort_by(|a, b| b.ordering_key().cmp(&a.ordering_key()));
            return;
        }

        if let Some(worst) = inner.entries.last() {
            if candidate.ordering_key() > worst.ordering_key() {
                inner.entries.pop();
                inner.entries.push(candidate);
                inner.entries.sort_by(|a, b| b.ordering_key().cmp(&a.ordering_key()));
            }
        }
    }

    /// The top `n` contenders, best first. Returns fewer than `n` if the
    /// registry holds fewer entries.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<Contender> {
        let inner = self.inner.lock();
        inner.entries.iter().take(n).cloned().collect()
    }

    /// Number of contenders currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// True if no contenders have been considered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Persist the full ranked list to `path` (atomic write).
    ///
    /// # Errors
    /// Propagates [`PersistenceError`] from the underlying write.
    pub fn snapshot(&self, path: &Path) -> Result<(), PersistenceError> {
        let inner = self.inner.lock();
        atomic_write_json(path, &inner.entries)
    }

    /// Restore a registry from a snapshot written by [`ContenderRegistry::snapshot`].
    /// `capacity` need not match the snapshot's original capacity; entries
    /// beyond it are dropped, keeping the best-scored ones.
    ///
    /// # Errors
    /// Propagates [`PersistenceError`] from the underlying read.
    pub fn restore(path: &Path, capacity: usize) -> Result<Self, PersistenceError> {
        let entries: Vec<Contender> = read_json(path)?.unwrap_or_default();
        let next_sequence = entries.iter().map(|c| c.created_at_sequence).max().map_or(0, |m| m + 1);
        let mut entries = entries;
        entries.sort_by(|a, b| b.ordering_key().cmp(&a.ordering_key()));
        entries.truncate(capacity);
        Ok(Self { inner: Mutex::new(Inner { capacity, next_sequence, entries }) })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn seq(id: u8) -> Sequence {
        Sequence::new(vec![(id, 1)], 1).unwrap()
    }

    #[test]
    fn keeps_only_top_k_by_score() {
        let registry = ContenderRegistry::new(2);
        registry.consider(seq(1), 10.0);
        registry.consider(seq(4), 50.0);
        registry.consider(seq(7), 30.0);
        let top = registry.top(10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].score, 50.0);
        assert_eq!(top[1].score, 30.0);
    }

    #[test]
    fn ties_favor_earlier_discovery() {
        let registry = ContenderRegistry::new(1);
        registry.consider(seq(1), 10.0);
        registry.consider(seq(4), 10.0);
        let top = registry.top(1);
        assert_eq!(top[0].created_at_sequence, 0);
    }

    #[test]
    fn snapshot_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contenders.json");
        let registry = ContenderRegistry::new(5);
        registry.consider(seq(1), 10.0);
        registry.consider(seq(4), 50.0);
        registry.snapshot(&path).unwrap();

        let restored = ContenderRegistry::restore(&path, 5).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.top(1)[0].score, 50.0);
    }
}
