//! Execution Environment and its pool (§9).
//!
//! A search driver fans a job out across worker threads; each worker needs
//! its own [`Pipeline`]-compatible view (a registry reference plus the
//! active [`Globals`]) without re-bootstrapping the registry per task. The
//! pool hands out cheap clones and never shrinks once warmed.

use std::sync::Arc;

use crate::cutlist::CutList;
use crate::registry::TransformRegistry;
use crate::settings::Globals;

/// Everything one search-driver worker needs to score a candidate, scoped
/// so it can be cloned cheaply (the registry and cutlist are shared via
/// `Arc`; only the settings snapshot is owned per clone).
#[derive(Clone)]
pub struct ExecutionEnvironment {
    /// Shared, immutable transform table.
    pub registry: Arc<TransformRegistry>,
    /// Shared pruning matrix (read-mostly; workers consult it far more than
    /// they update it, so it is wrapped by the caller in a lock if mutated
    /// concurrently — this struct only borrows a snapshot).
    pub cutlist: Arc<CutList>,
    /// This worker's settings snapshot, cloned from the job's globals at
    /// dispatch time so later global-settings changes never affect an
    /// in-flight job.
    pub globals: Globals,
}

impl ExecutionEnvironment {
    /// Build a fresh environment from shared state plus a settings snapshot.
    #[must_use]
    pub fn new(registry: Arc<TransformRegistry>, cutlist: Arc<CutList>, globals: Globals) -> Self {
        Self { registry, cutlist, globals }
    }
}

/// Pool of pre-built [`ExecutionEnvironment`]s, rented out to search-driver
/// worker threads and returned when a unit of work completes. Renting never
/// blocks: if the pool is empty it builds a fresh clone on the spot, since
/// cloning is cheap (two `Arc` bumps and a small settings copy).
pub struct EnvironmentPool {
    registry: Arc<TransformRegistry>,
    cutlist: Arc<CutList>,
    globals: Globals,
    spares: parking_lot::Mutex<Vec<ExecutionEnvironment>>,
}

impl EnvironmentPool {
    /// Create a pool seeded with `warm_count` pre-built environments.
    #[must_use]
    pub fn new(registry: TransformRegistry, cutlist: CutList, globals: Globals, warm_count: usize) -> Self {
        let registry = Arc::new(registry);
        let cutlist = Arc::new(cutlist);
        let spares = (0..warm_count)
            .map(|_| ExecutionEnvironment::new(registry.clone(), cutlist.clone(), globals.clone()))
            .collect();
        Self { registry, cutlist, globals, spares: parking_lot::Mutex::new(spares) }
    }

    /// Rent one environment, reusing a warm spare if available.
    #[must_use]
    pub fn rent(&self) -> ExecutionEnvironment {
        let mut spares = self.spares.lock();
        spares.pop().unwrap_or_else(|| {
            ExecutionEnvironment::new(self.registry.clone(), self.cutlist.clone(), self.globals.clone())
        })
    }

    /// Return an environment to the pool for reuse.
    pub fn return_env(&self, env: ExecutionEnvironment) {
        self.spares.lock().push(env);
    }

    /// Number of warm spares currently held.
    #[must_use]
    pub fn spare_count(&self) -> usize {
        self.spares.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rent_reuses_spares_before_allocating() {
        let pool = EnvironmentPool::new(TransformRegistry::bootstrap(), CutList::new(), Globals::default(), 2);
        assert_eq!(pool.spare_count(), 2);
        let a = pool.rent();
        let b = pool.rent();
        assert_eq!(pool.spare_count(), 0);
        pool.return_env(a);
        pool.return_env(b);
        assert_eq!(pool.spare_count(), 2);
    }

    #[test]
    fn rent_on_empty_pool_builds_fresh() {
        let pool = EnvironmentPool::new(TransformRegistry::bootstrap(), CutList::new(), Globals::default(), 0);
        let env = pool.rent();
        assert_eq!(env.registry.len(), TransformRegistry::bootstrap().len());
    }
}
