//! Search Drivers (component H).
//!
//! Three lazy iterators over candidate [`Sequence`]s — Munge, BTR, and
//! Best-Fit — plus the shared scoring pipeline each driver feeds candidates
//! through. Drivers are plain iterators; parallelism comes from handing the
//! iterator to `rayon`'s `par_bridge` at the call site (see
//! [`run_driver_parallel`]), not from anything baked into the iterator
//! itself.

pub mod bestfit;
pub mod btr;
pub mod munge;
pub mod pool;

use crate::analysis::{self, AnalysisInputs};
use crate::avalanche;
use crate::contenders::ContenderRegistry;
use crate::cutlist::CutList;
use crate::env::EnvironmentPool;
use crate::error::SearchError;
use crate::faildb::FailDbSink;
use crate::pipeline::Pipeline;
use crate::profiler::InputType;
use crate::registry::TransformRegistry;
use crate::sequence::Sequence;
use crate::settings::Globals;

/// Everything one candidate evaluation needs beyond the sequence itself.
pub struct SearchJob<'a> {
    /// Registry used to resolve and invert transform ids.
    pub registry: &'a TransformRegistry,
    /// Pruning matrix consulted (not mutated) by this evaluation.
    pub cutlist: &'a CutList,
    /// Active settings snapshot.
    pub globals: &'a Globals,
    /// Plaintext all candidates in this job encrypt.
    pub plaintext: &'a [u8],
    /// Password all candidates in this job derive keys from.
    pub password: &'a [u8],
    /// Fixed-size salt mixed into key derivation.
    pub salt: [u8; 8],
    /// Classification used for CutList bucket lookups.
    pub data_type: InputType,
    /// Mirrors the `--no-cutlist` flag used to build the candidate pool:
    /// when set, per-candidate filtering is skipped too, so a bypassed pool
    /// is not silently re-cut during evaluation.
    pub no_cutlist: bool,
    /// Optional sink for candidates that fail `pass_count`, active when
    /// `-CreateMungeFailDB` is set. [`FailDbSink::disabled`] when not.
    pub fail_sink: &'a FailDbSink,
}

/// Outcome of scoring one candidate sequence.
#[derive(Debug, Clone)]
pub struct Scored {
    /// The candidate sequence.
    pub sequence: Sequence,
    /// Aggregate score under the job's configured scoring/operation mode.
    pub score: f64,
    /// Number of the nine metrics that passed.
    pub metrics_passed: u32,
}

/// Whether every transform id in `sequence` survives the job's CutList at
/// `level` (the sequence's own length, by convention).
#[must_use]
pub fn passes_cutlist(job: &SearchJob<'_>, sequence: &Sequence) -> bool {
    if job.no_cutlist {
        return true;
    }
    let level = sequence.len() as u32;
    !sequence.steps.iter().any(|step| {
        job.cutlist.is_cut(step.transform_id, level, job.globals.pass_count, job.data_type)
    })
}

/// Encrypt, sample avalanche/key-dependency companions, run all nine
/// metrics, and aggregate into one score.
///
/// # Errors
/// Propagates pipeline or analysis failures for this candidate.
pub fn evaluate(job: &SearchJob<'_>, sequence: &Sequence) -> Result<Scored, SearchError> {
    evaluate_with(job.registry, job.globals, job, sequence)
}

/// Same as [`evaluate`] but resolves the registry and settings snapshot
/// from a rented [`ExecutionEnvironment`] instead of the job directly, so a
/// worker thread never touches another worker's settings snapshot mid-run.
///
/// # Errors
/// Propagates pipeline or analysis failures for this candidate.
fn evaluate_with(
    registry: &TransformRegistry,
    globals: &Globals,
    job: &SearchJob<'_>,
    sequence: &Sequence,
) -> Result<Scored, SearchError> {
    let pipeline = Pipeline::new(registry);
    let sample = avalanche::sample(&pipeline, sequence, job.password, job.salt, job.plaintext)?;

    let ciphertext = Pipeline::payload_only(&sample.baseline)?;
    let avalanche_ciphertext = Pipeline::payload_only(&sample.plaintext_flipped)?;
    let key_dependency_ciphertext = Pipeline::payload_only(&sample.key_flipped)?;

    let inputs = AnalysisInputs {
        ciphertext,
        avalanche_ciphertext,
        key_dependency_ciphertext,
        original_plaintext: job.plaintext,
    };
    let results = analysis::run_all_metrics(&inputs, globals.mode)?;
    let metrics_passed = results.iter().filter(|r| r.passed).count() as u32;
    let score = analysis::aggregate_score(&results, globals.scoring_mode, globals.mode);

    Ok(Scored { sequence: sequence.clone(), score, metrics_passed })
}

/// Drive `candidates` to completion, scoring each (skipping anything the
/// CutList prunes) and offering passing results to `contenders`. Sequential
/// by construction; call sites that want parallelism iterate the same
/// candidate source across `rayon` worker threads instead (each worker
/// holds its own [`crate::env::ExecutionEnvironment`] rented from an
/// [`crate::env::EnvironmentPool`]).
///
/// # Errors
/// Returns the first [`SearchError`] encountered; callers that want a
/// best-effort sweep should catch and log per-candidate instead of using
/// this helper directly.
pub fn run_driver_sequential<I>(
    job: &SearchJob<'_>,
    candidates: I,
    contenders: &ContenderRegistry,
) -> Result<u64, SearchError>
where
    I: Iterator<Item = Sequence>,
{
    let mut evaluated = 0u64;
    for sequence in candidates {
        if !passes_cutlist(job, &sequence) {
            continue;
        }
        let scored = evaluate(job, &sequence)?;
        if scored.metrics_passed >= job.globals.pass_count {
            contenders.consider(scored.sequence, scored.score);
        } else {
            job.fail_sink.record(&scored.sequence, job.registry, format!("{}/9 metrics passed", scored.metrics_passed));
        }
        evaluated += 1;
    }
    Ok(evaluated)
}

/// Drive `candidates` across the `rayon` global pool when the `multithread`
/// feature is enabled (falls back to [`run_driver_sequential`] otherwise).
/// Each candidate is scored independently so a single slow or erroring
/// candidate never blocks the others. Every candidate is scored against an
/// [`ExecutionEnvironment`] rented from a small pool seeded from the job's
/// own registry/cutlist/settings, so concurrent workers never share a
/// settings snapshot even if the caller later mutates `job.globals`.
pub fn run_driver_parallel<I>(job: &SearchJob<'_>, candidates: I, contenders: &ContenderRegistry) -> u64
where
    I: Iterator<Item = Sequence> + Send,
    I::Item: Send,
{
    #[cfg(feature = "multithread")]
    {
        use rayon::iter::{ParallelBridge, ParallelIterator};
        let envs = EnvironmentPool::new((*job.registry).clone(), (*job.cutlist).clone(), (*job.globals).clone(), 0);
        candidates
            .par_bridge()
            .filter(|sequence| passes_cutlist(job, sequence))
            .filter_map(|sequence| {
                let env = envs.rent();
                let result = evaluate_with(&env.registry, &env.globals, job, &sequence).ok();
                envs.return_env(env);
                result
            })
            .map(|scored| {
                if scored.metrics_passed >= job.globals.pass_count {
                    contenders.consider(scored.sequence, scored.score);
                } else {
                    job.fail_sink.record(&scored.sequence, job.registry, format!("{}/9 metrics passed", scored.metrics_passed));
                }
                1u64
            })
            .sum()
    }
    #[cfg(not(feature = "multithread"))]
    {
        run_driver_sequential(job, candidates, contenders).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::contenders::ContenderRegistry;
    use crate::settings::Globals;

    #[test]
    fn sequential_driver_finds_at_least_one_contender() {
        let registry = TransformRegistry::bootstrap();
        let cutlist = CutList::new();
        let mut globals = Globals::default();
        globals.pass_count = 0; // accept everything so the smoke test is deterministic
        let plaintext = b"the quick brown fox jumps over the lazy dog, repeated for length";
        let job = SearchJob {
            registry: &registry,
            cutlist: &cutlist,
            globals: &globals,
            plaintext,
            password: b"hunter2",
            salt: [9u8; 8],
            data_type: InputType::Natural,
            no_cutlist: false,
            fail_sink: &FailDbSink::disabled(),
        };
        let contenders = ContenderRegistry::new(10);
        let pool: Vec<u8> = registry.iterate().map(|t| t.id).collect();
        let candidates = munge::MungeIterator::new(&pool, 1, 2);
        let n = run_driver_sequential(&job, candidates, &contenders).unwrap();
        assert!(n > 0);
        assert!(!contenders.is_empty());
    }
}
