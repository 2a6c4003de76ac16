//! Munge driver: permutation search *with* repetition.
//!
//! Enumerates every sequence of exactly `level` transforms drawn from a
//! candidate pool, allowing the same id to appear more than once (e.g.
//! `XorConstant -> XorConstant -> RotateLeft8` is a valid candidate at level
//! 3). Implemented as an odometer: `digits[i]` indexes into `ids` for
//! position `i`, incremented like a counter so the iterator never
//! materializes more than one sequence at a time. `pool.len()^level`
//! candidates total (`SPEC_FULL.md` §4.H.1).
//!
//! The pool itself — CutList-filtered and optionally inverse-deduplicated —
//! is built by [`crate::search::pool::build_pool`] at the call site, once
//! per level; this iterator only ever sees the already-filtered ids.

use crate::sequence::Sequence;

/// Lazy odometer over every `pool^level` combination at a fixed length.
pub struct MungeIterator {
    ids: Vec<u8>,
    global_rounds: u32,
    digits: Vec<usize>,
    exhausted: bool,
}

impl MungeIterator {
    /// Build an iterator over every length-`level` ordered sequence (with
    /// repetition) drawn from `pool`, all at the given `global_rounds`.
    #[must_use]
    pub fn new(pool: &[u8], level: usize, global_rounds: u32) -> Self {
        let mut ids = pool.to_vec();
        ids.sort_unstable();
        let level = level.max(1);
        let global_rounds = global_rounds.clamp(crate::sequence::MIN_ROUNDS, crate::sequence::MAX_ROUNDS);
        let exhausted = ids.is_empty();
        Self { ids, global_rounds, digits: vec![0; level], exhausted }
    }

    fn advance_digits(&mut self) -> bool {
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < self.ids.len() {
                return true;
            }
            *digit = 0;
        }
        false
    }

    #[allow(clippy::expect_used)] // global_rounds is clamped in `new`; per-step rounds is always 1.
    fn build_sequence(&self) -> Sequence {
        let steps: Vec<(u8, u32)> = self.digits.iter().map(|&d| (self.ids[d], 1)).collect();
        Sequence::new(steps, self.global_rounds).expect("odometer only emits valid (id, rounds) pairs")
    }
}

impl Iterator for MungeIterator {
    type Item = Sequence;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let result = self.build_sequence();

        if !self.advance_digits() {
            self.exhausted = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::registry::TransformRegistry;

    fn all_ids(registry: &TransformRegistry) -> Vec<u8> {
        registry.iterate().map(|t| t.id).collect()
    }

    #[test]
    fn level_one_yields_exactly_the_pool_size() {
        let registry = TransformRegistry::bootstrap();
        let ids = all_ids(&registry);
        let count = MungeIterator::new(&ids, 1, 1).count();
        assert_eq!(count, ids.len());
    }

    #[test]
    fn level_two_yields_pool_size_squared_and_allows_repeats() {
        let registry = TransformRegistry::bootstrap();
        let ids = all_ids(&registry);
        let seqs: Vec<Sequence> = MungeIterator::new(&ids, 2, 1).collect();
        let n = ids.len();
        assert_eq!(seqs.len(), n * n);
        assert!(seqs.iter().any(|s| s.steps[0].transform_id == s.steps[1].transform_id));
    }

    #[test]
    fn level_three_on_a_three_item_pool_yields_27() {
        // Mirrors the dry-run property in `SPEC_FULL.md` §8: a 3-transform
        // pool at level 3 has exactly 3^3 = 27 candidates.
        let registry = TransformRegistry::bootstrap();
        let pool: Vec<u8> = all_ids(&registry).into_iter().take(3).collect();
        let count = MungeIterator::new(&pool, 3, 1).count();
        assert_eq!(count, 27);
    }

    #[test]
    fn every_emitted_sequence_respects_global_rounds() {
        let registry = TransformRegistry::bootstrap();
        let ids = all_ids(&registry);
        for seq in MungeIterator::new(&ids, 2, 4) {
            assert_eq!(seq.global_rounds, 4);
        }
    }

    #[test]
    fn empty_pool_yields_nothing() {
        assert_eq!(MungeIterator::new(&[], 3, 1).count(), 0);
    }
}
