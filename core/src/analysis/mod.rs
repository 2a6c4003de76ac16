//! Cryptanalysis Engine (component D).
//!
//! Runs the nine weighted metrics against a candidate ciphertext and its
//! avalanche/key-dependency companions, then computes one aggregate score
//! under the active [`ScoringMode`].

mod metrics;
mod scoring;
mod weights;

pub use metrics::{MetricKind, ALL_METRICS};
pub use scoring::{aggregate_score, classify_band, AnalysisResult, ScoreBand};
pub use weights::OperationMode;

use crate::error::AnalysisError;

/// Which of the two aggregate-scoring algorithms (§4.D) is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoringMode {
    /// Classify each metric into a pass/fail band and sum banded points.
    /// Default mode.
    Practical,
    /// Rescale each metric relative to its expected range and combine with
    /// logarithmic compression (Decision D2 in `DESIGN.md`).
    Metric,
}

impl ScoringMode {
    /// Canonical name used in filenames and settings (`-S<P|M>`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Practical => "Practical",
            Self::Metric => "Metric",
        }
    }

    /// Parse a canonical or single-letter form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Practical" | "P" | "p" => Some(Self::Practical),
            "Metric" | "M" | "m" => Some(Self::Metric),
            _ => None,
        }
    }
}

/// The four payloads required by the engine (§4.D "Inputs required per call").
pub struct AnalysisInputs<'a> {
    /// Ciphertext payload (header already stripped).
    pub ciphertext: &'a [u8],
    /// Ciphertext of the plaintext with one bit flipped.
    pub avalanche_ciphertext: &'a [u8],
    /// Ciphertext produced with one bit flipped in the key.
    pub key_dependency_ciphertext: &'a [u8],
    /// The original plaintext.
    pub original_plaintext: &'a [u8],
}

/// Run all nine metrics and return their raw results (unweighted,
/// un-aggregated — see [`aggregate_score`] for the weighted combination).
///
/// # Errors
/// Returns [`AnalysisError::InvalidInput`] if `inputs.ciphertext` is empty.
pub fn run_all_metrics(
    inputs: &AnalysisInputs<'_>,
    mode: OperationMode,
) -> Result<Vec<AnalysisResult>, AnalysisError> {
    if inputs.ciphertext.is_empty() {
        return Err(AnalysisError::InvalidInput("ciphertext payload is empty".into()));
    }
    let thresholds = weights::practical_thresholds();
    Ok(ALL_METRICS
        .iter()
        .map(|&kind| {
            let raw = metrics::raw_score(kind, inputs);
            let threshold = thresholds[kind as usize];
            let passed = metrics::passes_threshold(kind, raw, threshold);
            AnalysisResult {
                metric_name: kind,
                score: raw,
                threshold,
                passed,
                notes: metrics::describe(kind, raw, threshold, passed),
            }
        })
        .collect())
}
