//! Candidate pool construction (§4.H.1 step 1): the registry, filtered by
//! the [`CutList`] and optionally inverse-deduplicated, that Munge and
//! Best-Fit enumerate over.

use std::collections::HashSet;

use crate::cutlist::CutList;
use crate::profiler::InputType;
use crate::registry::TransformRegistry;

/// Build the candidate pool for one Munge/Best-Fit run.
///
/// `no_cutlist` skips the CutList filter entirely (`--no-cutlist`).
/// `remove_inverse` additionally drops any id whose inverse already appears
/// earlier in the (registry-ordered) pool, so a transform and its inverse
/// never both show up as candidates in the same run (`--remove-inverse`);
/// involutions (`inverse_id == id`) are always kept.
#[must_use]
pub fn build_pool(
    registry: &TransformRegistry,
    cutlist: &CutList,
    level: u32,
    pass_count: u32,
    data_type: InputType,
    no_cutlist: bool,
    remove_inverse: bool,
) -> Vec<u8> {
    let mut ids: Vec<u8> = registry
        .iterate()
        .map(|t| t.id)
        .filter(|&id| no_cutlist || !cutlist.is_cut(id, level, pass_count, data_type))
        .collect();

    if remove_inverse {
        let mut seen = HashSet::new();
        ids.retain(|&id| {
            let inverse = registry.inverse_id(id).unwrap_or(id);
            if inverse != id && seen.contains(&inverse) {
                false
            } else {
                seen.insert(id);
                true
            }
        });
    }

    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_cutlist_bypasses_an_otherwise_fully_cut_bucket() {
        let registry = TransformRegistry::bootstrap();
        let cutlist = CutList::new(); // above gating, an empty bucket cuts everything
        let without_bypass = build_pool(&registry, &cutlist, 5, 3, InputType::Random, false, false);
        assert!(without_bypass.is_empty());
        let with_bypass = build_pool(&registry, &cutlist, 5, 3, InputType::Random, true, false);
        assert_eq!(with_bypass.len(), registry.len());
    }

    #[test]
    fn below_gating_cutlist_has_no_effect() {
        let registry = TransformRegistry::bootstrap();
        let cutlist = CutList::new();
        let pool = build_pool(&registry, &cutlist, 1, 1, InputType::Random, false, false);
        assert_eq!(pool.len(), registry.len());
    }

    #[test]
    fn remove_inverse_drops_exactly_one_of_each_pair() {
        let registry = TransformRegistry::bootstrap();
        let cutlist = CutList::new();
        let pool = build_pool(&registry, &cutlist, 1, 1, InputType::Random, false, true);
        for &id in &pool {
            let inverse = registry.inverse_id(id).unwrap();
            if inverse != id {
                assert!(!pool.contains(&inverse) || inverse == id, "both halves of a pair survived: {id}/{inverse}");
            }
        }
    }

    #[test]
    fn remove_inverse_keeps_involutions() {
        let registry = TransformRegistry::bootstrap();
        let cutlist = CutList::new();
        let pool = build_pool(&registry, &cutlist, 1, 1, InputType::Random, false, true);
        // XorConstant (id 1) is its own inverse and must survive.
        assert!(pool.contains(&1));
    }
}
