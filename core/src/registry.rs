//! Transform Registry (component A).
//!
//! A keyed table from `transform_id` (1-255) to [`Transform`] descriptor.
//! Registration happens once at startup via [`TransformRegistry::bootstrap`];
//! thereafter the table is immutable and lock-free to read.

use std::collections::BTreeMap;

use crate::error::RegistryError;
use crate::transforms::catalog;

/// Coarse grouping used only for human-readable CLI listings; has no
/// effect on pipeline semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformCategory {
    /// Table or key-driven byte substitution.
    Substitution,
    /// Reordering of bytes or bits without changing their values.
    Permutation,
    /// Modular addition/subtraction style transforms.
    Arithmetic,
    /// XOR, rotate, and other bitwise operations.
    Bitwise,
    /// Transforms whose output at position `i` depends on prior output.
    Feedback,
}

/// Descriptor for a single reversible byte-level transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// 8-bit identifier, 1-255.
    pub id: u8,
    /// Human label, e.g. `"XorConstant"`.
    pub name: &'static str,
    /// Id of the inverse transform; equals `id` for involutions.
    pub inverse_id: u8,
    /// Coarse category for display purposes only.
    pub category: TransformCategory,
    /// Measured per-op cost on a reference machine, in milliseconds.
    /// Populated by the `benchmark` CLI command; `0.0` until measured.
    pub benchmark_time_ms: f64,
}

/// Immutable, lock-free-to-read table of registered transforms.
#[derive(Debug, Clone)]
pub struct TransformRegistry {
    entries: BTreeMap<u8, Transform>,
}

impl TransformRegistry {
    /// Build the registry from the built-in catalog (§4.A supplement in
    /// `SPEC_FULL.md`). Panics only on a programmer error in the catalog
    /// itself (checked by `debug_assert` and by `tests/registry.rs`).
    #[must_use]
    pub fn bootstrap() -> Self {
        let mut entries = BTreeMap::new();
        for t in catalog::built_in_transforms() {
            entries.insert(t.id, t);
        }
        let registry = Self { entries };
        debug_assert!(
            registry.verify_invariant().is_ok(),
            "built-in catalog violates the inverse-closure invariant"
        );
        registry
    }

    /// Look up a transform by id.
    ///
    /// # Errors
    /// Returns [`RegistryError::UnknownTransform`] if `id` is not registered.
    pub fn get(&self, id: u8) -> Result<&Transform, RegistryError> {
        self.entries.get(&id).ok_or(RegistryError::UnknownTransform(id))
    }

    /// Return the inverse id for `id`.
    ///
    /// # Errors
    /// Returns [`RegistryError::UnknownTransform`] if `id` is not registered.
    pub fn inverse_id(&self, id: u8) -> Result<u8, RegistryError> {
        Ok(self.get(id)?.inverse_id)
    }

    /// Iterate all registered transforms, ordered by id.
    pub fn iterate(&self) -> impl Iterator<Item = &Transform> {
        self.entries.values()
    }

    /// Number of registered transforms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no transforms are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a freshly measured benchmark time for `id`, returning an
    /// updated registry (the table is otherwise immutable post-bootstrap).
    ///
    /// # Errors
    /// Returns [`RegistryError::UnknownTransform`] if `id` is not registered.
    pub fn with_benchmark(&self, id: u8, time_ms: f64) -> Result<Self, RegistryError> {
        let mut next = self.clone();
        let entry = next
            .entries
            .get_mut(&id)
            .ok_or(RegistryError::UnknownTransform(id))?;
        entry.benchmark_time_ms = time_ms;
        Ok(next)
    }

    /// Verify the registry invariant: every id's inverse is present, and
    /// the inverse relation is symmetric.
    ///
    /// # Errors
    /// Returns [`RegistryError::InverseMissing`] on the first violation found.
    pub fn verify_invariant(&self) -> Result<(), RegistryError> {
        for t in self.entries.values() {
            let inverse = self
                .entries
                .get(&t.inverse_id)
                .ok_or(RegistryError::InverseMissing(t.inverse_id))?;
            if inverse.inverse_id != t.id {
                return Err(RegistryError::InverseMissing(t.inverse_id));
            }
        }
        Ok(())
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::bootstrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_satisfies_inverse_closure() {
        let reg = TransformRegistry::bootstrap();
        assert!(reg.verify_invariant().is_ok());
    }

    #[test]
    fn unknown_transform_errors() {
        let reg = TransformRegistry::bootstrap();
        assert_eq!(reg.get(250), Err(RegistryError::UnknownTransform(250)));
    }

    #[test]
    fn iterate_is_ordered_by_id() {
        let reg = TransformRegistry::bootstrap();
        let ids: Vec<u8> = reg.iterate().map(|t| t.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
