//! Aggregate scoring: combine nine per-metric results into one number.

use super::metrics::{Direction, MetricKind};
use super::weights::{metric_ranges, OperationMode};
use super::ScoringMode;

/// Result of running a single metric against one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Which metric produced this result.
    pub metric_name: MetricKind,
    /// Raw (un-normalized) score.
    pub score: f64,
    /// Threshold the raw score was checked against.
    pub threshold: f64,
    /// Whether the metric passed under Practical scoring.
    pub passed: bool,
    /// Human-readable explanation, for `Contenders,-*.txt`.
    pub notes: String,
}

/// Coarse pass/fail bucket a candidate's aggregate score falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreBand {
    /// Passed every metric under the active mode.
    Strong,
    /// Passed at least the configured `pass_count` metrics.
    Marginal,
    /// Passed fewer than `pass_count` metrics.
    Weak,
}

/// Classify a candidate by how many of its nine results passed, against the
/// configured minimum (`Globals::pass_count`).
#[must_use]
pub fn classify_band(results: &[AnalysisResult], pass_count: u32) -> ScoreBand {
    let passed = results.iter().filter(|r| r.passed).count() as u32;
    if passed == results.len() as u32 {
        ScoreBand::Strong
    } else if passed >= pass_count {
        ScoreBand::Marginal
    } else {
        ScoreBand::Weak
    }
}

/// Distance of `raw` from "ideal" for `kind`, in the metric's own units,
/// collapsed to a single non-negative scalar regardless of [`Direction`].
fn distance_from_ideal(kind: MetricKind, raw: f64) -> f64 {
    match kind.direction() {
        Direction::HighIsGood => {
            let (_, ceiling) = metric_ranges()[kind as usize];
            (ceiling - raw).max(0.0)
        }
        Direction::LowIsGood => raw.max(0.0),
        Direction::NearValue(target) => (raw - target).abs(),
    }
}

/// Combine nine [`AnalysisResult`]s into one `0..=100` aggregate score under
/// the active [`ScoringMode`] and [`OperationMode`] weight table.
#[must_use]
pub fn aggregate_score(results: &[AnalysisResult], scoring: ScoringMode, mode: OperationMode) -> f64 {
    let weights = mode.weights();
    match scoring {
        ScoringMode::Practical => aggregate_practical(results, &weights),
        ScoringMode::Metric => aggregate_metric(results, &weights),
    }
}

/// Sum banded points: each metric contributes its full weight if it passed,
/// nothing otherwise, rescaled to `0..=100` of the weight total.
fn aggregate_practical(results: &[AnalysisResult], weights: &[f64; 9]) -> f64 {
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let earned: f64 = results
        .iter()
        .map(|r| if r.passed { weights[r.metric_name as usize] } else { 0.0 })
        .sum();
    100.0 * earned / total_weight
}

/// Rescale each metric relative to its expected range and combine with
/// logarithmic compression, per Decision D2 in `DESIGN.md`:
///
/// `normalized = clamp((ceiling - distance) / (ceiling - floor), 0, 1.2)`,
/// `contribution = weight * ln(1 + normalized)`, summed and rescaled by
/// `100 / ln(1 + 1.2 * sum(weights))` so a perfect candidate scores 100.
fn aggregate_metric(results: &[AnalysisResult], weights: &[f64; 9]) -> f64 {
    let ranges = metric_ranges();
    let mut sum = 0.0;
    for r in results {
        let idx = r.metric_name as usize;
        let (floor, ceiling) = ranges[idx];
        let span = (ceiling - floor).max(f64::EPSILON);
        let distance = distance_from_ideal(r.metric_name, r.score);
        let normalized = ((span - distance) / span).clamp(0.0, 1.2);
        sum += weights[idx] * (1.0 + normalized).ln();
    }
    let total_weight: f64 = weights.iter().sum();
    let denom = (1.0 + 1.2 * total_weight).ln();
    if denom <= 0.0 {
        0.0
    } else {
        100.0 * sum / denom
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::analysis::{run_all_metrics, AnalysisInputs};

    fn make_results(ciphertext: &[u8]) -> Vec<AnalysisResult> {
        let plaintext = vec![0u8; ciphertext.len()];
        let flipped = {
            let mut v = ciphertext.to_vec();
            v[0] ^= 1;
            v
        };
        let inputs = AnalysisInputs {
            ciphertext,
            avalanche_ciphertext: &flipped,
            key_dependency_ciphertext: &flipped,
            original_plaintext: &plaintext,
        };
        run_all_metrics(&inputs, OperationMode::None).unwrap()
    }

    #[test]
    fn practical_score_is_bounded() {
        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        let data: Vec<u8> = (0..2048)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state & 0xFF) as u8
            })
            .collect();
        let results = make_results(&data);
        let score = aggregate_score(&results, ScoringMode::Practical, OperationMode::None);
        assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn metric_score_is_bounded() {
        let data = vec![0x5Au8; 1024];
        let results = make_results(&data);
        let score = aggregate_score(&results, ScoringMode::Metric, OperationMode::Cryptographic);
        assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn classify_band_strong_when_all_pass() {
        let results = vec![AnalysisResult {
            metric_name: MetricKind::Entropy,
            score: 8.0,
            threshold: 7.5,
            passed: true,
            notes: String::new(),
        }];
        assert_eq!(classify_band(&results, 1), ScoreBand::Strong);
    }
}
