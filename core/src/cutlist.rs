//! CutList Pruning Matrix (component G).
//!
//! A per-`(level, pass_count, data_type)` record of which transform ids are
//! worth trying at all. Search depth ("level") and the configured minimum
//! `pass_count` only start gating once both cross a threshold — below that,
//! every id is tried regardless of cut state, since the matrix has not yet
//! accumulated enough evidence to prune safely.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::persistence::{atomic_write_json, read_json};
use crate::profiler::InputType;
use crate::sequence::Sequence;

/// Search depth at or above which pruning takes effect.
pub const GATING_LEVEL: u32 = 3;
/// Minimum configured `pass_count` at or above which pruning takes effect.
pub const GATING_PASS_COUNT: u32 = 2;

fn data_type_name(ty: InputType) -> &'static str {
    match ty {
        InputType::Combined => "Combined",
        InputType::Natural => "Natural",
        InputType::Random => "Random",
        InputType::Sequence => "Sequence",
        InputType::UserData => "UserData",
    }
}

fn key_string(level: u32, pass_count: u32, data_type: InputType) -> String {
    format!("{level}:{pass_count}:{}", data_type_name(data_type))
}

/// The set of ids known to be cut (pruned) for one `(level, pass_count,
/// data_type)` bucket. An id absent from `kept` and `cut` alike is treated
/// as cut by default (Decision D3 in `DESIGN.md`): the matrix only grows
/// permissive entries as Munge runs explicitly demonstrate an id is worth
/// keeping at that depth.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Bucket {
    kept: std::collections::BTreeSet<u8>,
    cut: std::collections::BTreeSet<u8>,
}

/// Pruning matrix, serialized as a flat `{ "level:pass_count:data_type": Bucket }` map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CutList {
    buckets: BTreeMap<String, Bucket>,
}

impl CutList {
    /// An empty matrix: below the gating thresholds nothing is pruned, and
    /// above them everything is cut by default until explicitly kept.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` should be skipped at this `(level, pass_count, data_type)`.
    #[must_use]
    pub fn is_cut(&self, id: u8, level: u32, pass_count: u32, data_type: InputType) -> bool {
        if level < GATING_LEVEL || pass_count < GATING_PASS_COUNT {
            return false;
        }
        let key = key_string(level, pass_count, data_type);
        match self.buckets.get(&key) {
            Some(bucket) => !bucket.kept.contains(&id),
            None => true,
        }
    }

    /// Record that `id` produced a passing candidate at this bucket, so
    /// future searches at the same depth keep trying it.
    pub fn mark_kept(&mut self, id: u8, level: u32, pass_count: u32, data_type: InputType) {
        let key = key_string(level, pass_count, data_type);
        let bucket = self.buckets.entry(key).or_default();
        bucket.cut.remove(&id);
        bucket.kept.insert(id);
    }

    /// Record that `id` failed at this bucket, making the cut explicit
    /// (mostly for diagnostics; absence already implies cut).
    pub fn mark_cut(&mut self, id: u8, level: u32, pass_count: u32, data_type: InputType) {
        let key = key_string(level, pass_count, data_type);
        let bucket = self.buckets.entry(key).or_default();
        bucket.kept.remove(&id);
        bucket.cut.insert(id);
    }

    /// Level-completion update (§4.H.1 step 5): mark every transform id
    /// that appears anywhere in `top10`'s sequences as kept for this
    /// `(level, pass_count, data_type)` bucket. Ids absent from `top10` are
    /// left untouched rather than explicitly re-cut, so a keep recorded
    /// earlier in the same run is never downgraded by a later, sparser
    /// top-10 (the monotonicity property in `SPEC_FULL.md` §8).
    pub fn update_from_top10<'a>(
        &mut self,
        top10: impl IntoIterator<Item = &'a Sequence>,
        level: u32,
        pass_count: u32,
        data_type: InputType,
    ) {
        for seq in top10 {
            for step in &seq.steps {
                self.mark_kept(step.transform_id, level, pass_count, data_type);
            }
        }
    }

    /// Number of buckets with at least one recorded id.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Load from `path`, or an empty matrix if the file does not exist.
    ///
    /// # Errors
    /// Returns [`PersistenceError::CutListMalformed`] if the file exists
    /// but fails to parse, or a propagated I/O error.
    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        match read_json(path) {
            Ok(v) => Ok(v.unwrap_or_default()),
            Err(PersistenceError::Serde(e)) => Err(PersistenceError::CutListMalformed(e.to_string())),
            Err(e) => Err(e),
        }
    }

    /// Persist to `path` atomically.
    ///
    /// # Errors
    /// Propagates [`PersistenceError`] from the underlying write.
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        atomic_write_json(path, self)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn below_gating_threshold_nothing_is_cut() {
        let list = CutList::new();
        assert!(!list.is_cut(5, 1, 1, InputType::Random));
    }

    #[test]
    fn unknown_bucket_above_gating_cuts_by_default() {
        let list = CutList::new();
        assert!(list.is_cut(5, 3, 2, InputType::Random));
    }

    #[test]
    fn marking_kept_clears_the_cut() {
        let mut list = CutList::new();
        list.mark_kept(5, 3, 2, InputType::Random);
        assert!(!list.is_cut(5, 3, 2, InputType::Random));
        assert!(list.is_cut(6, 3, 2, InputType::Random));
    }

    #[test]
    fn save_and_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cutlist.json");
        let mut list = CutList::new();
        list.mark_kept(5, 3, 2, InputType::Natural);
        list.save(&path).unwrap();

        let restored = CutList::load(&path).unwrap();
        assert!(!restored.is_cut(5, 3, 2, InputType::Natural));
        assert!(restored.is_cut(9, 3, 2, InputType::Natural));
    }

    #[test]
    fn update_from_top10_keeps_every_id_in_the_winning_sequences() {
        let mut list = CutList::new();
        let top10 = vec![
            Sequence::new(vec![(1, 1), (4, 2)], 1).unwrap(),
            Sequence::new(vec![(7, 1)], 1).unwrap(),
        ];
        list.update_from_top10(&top10, 3, 2, InputType::Combined);
        assert!(!list.is_cut(1, 3, 2, InputType::Combined));
        assert!(!list.is_cut(4, 3, 2, InputType::Combined));
        assert!(!list.is_cut(7, 3, 2, InputType::Combined));
        assert!(list.is_cut(9, 3, 2, InputType::Combined));
    }

    #[test]
    fn update_from_top10_never_downgrades_a_prior_keep_in_the_same_run() {
        let mut list = CutList::new();
        list.mark_kept(1, 3, 2, InputType::Combined);
        // A later, sparser top-10 that no longer mentions id 1 must not cut it.
        let top10 = vec![Sequence::new(vec![(7, 1)], 1).unwrap()];
        list.update_from_top10(&top10, 3, 2, InputType::Combined);
        assert!(!list.is_cut(1, 3, 2, InputType::Combined));
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let list = CutList::load(&path).unwrap();
        assert_eq!(list.bucket_count(), 0);
    }
}
