//! The nine cryptanalysis metrics (§4.D).

use super::AnalysisInputs;
use crate::statutil::{autocorrelation_peak, byte_deviation_from_uniform, hamming_distance_bits, pearson_correlation, shannon_entropy};

/// Identifies one of the nine metrics. The discriminant order is load-bearing:
/// it indexes the per-mode weight tables in `weights.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum MetricKind {
    /// Shannon entropy of ciphertext.
    Entropy = 0,
    /// Per-bit frequency balance.
    BitVariance = 1,
    /// Local similarity across a sliding window.
    SlidingWindow = 2,
    /// Byte histogram uniformity.
    FrequencyDistribution = 3,
    /// Autocorrelation peaks.
    PeriodicityCheck = 4,
    /// Plaintext/ciphertext dependence.
    MangosCorrelation = 5,
    /// Positional bias of bytes.
    PositionalMapping = 6,
    /// Hamming-distance ratio vs. a single-bit-flipped input.
    AvalancheScore = 7,
    /// Hamming-distance ratio vs. a single-bit-flipped key.
    KeyDependency = 8,
}

/// All nine metrics, in the canonical weight-table order.
pub const ALL_METRICS: [MetricKind; 9] = [
    MetricKind::Entropy,
    MetricKind::BitVariance,
    MetricKind::SlidingWindow,
    MetricKind::FrequencyDistribution,
    MetricKind::PeriodicityCheck,
    MetricKind::MangosCorrelation,
    MetricKind::PositionalMapping,
    MetricKind::AvalancheScore,
    MetricKind::KeyDependency,
];

impl MetricKind {
    /// Human label, e.g. for `Contenders,-*.txt` output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entropy => "Entropy",
            Self::BitVariance => "BitVariance",
            Self::SlidingWindow => "SlidingWindow",
            Self::FrequencyDistribution => "FrequencyDistribution",
            Self::PeriodicityCheck => "PeriodicityCheck",
            Self::MangosCorrelation => "MangosCorrelation",
            Self::PositionalMapping => "PositionalMapping",
            Self::AvalancheScore => "AvalancheScore",
            Self::KeyDependency => "KeyDependency",
        }
    }

    /// Whether a passing score is high, low, or close to a fixed target value.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Entropy => Direction::HighIsGood,
            Self::BitVariance => Direction::NearValue(0.5),
            Self::SlidingWindow
            | Self::FrequencyDistribution
            | Self::PeriodicityCheck
            | Self::MangosCorrelation
            | Self::PositionalMapping => Direction::LowIsGood,
            Self::AvalancheScore | Self::KeyDependency => Direction::NearValue(0.5),
        }
    }
}

/// How a metric's raw score relates to "good".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    /// Larger raw scores are better.
    HighIsGood,
    /// Smaller raw scores are better.
    LowIsGood,
    /// Scores close to the given target are better.
    NearValue(f64),
}

/// Compute the raw (un-normalized) value for `kind` over `inputs`.
#[must_use]
pub fn raw_score(kind: MetricKind, inputs: &AnalysisInputs<'_>) -> f64 {
    match kind {
        MetricKind::Entropy => shannon_entropy(inputs.ciphertext),
        MetricKind::BitVariance => bit_variance(inputs.ciphertext),
        MetricKind::SlidingWindow => sliding_window_similarity(inputs.ciphertext, 32),
        MetricKind::FrequencyDistribution => byte_deviation_from_uniform(inputs.ciphertext),
        MetricKind::PeriodicityCheck => autocorrelation_peak(inputs.ciphertext, 64),
        MetricKind::MangosCorrelation => {
            pearson_correlation(inputs.original_plaintext, inputs.ciphertext).abs()
        }
        MetricKind::PositionalMapping => positional_bias(inputs.ciphertext),
        MetricKind::AvalancheScore => hamming_ratio(inputs.ciphertext, inputs.avalanche_ciphertext),
        MetricKind::KeyDependency => hamming_ratio(inputs.ciphertext, inputs.key_dependency_ciphertext),
    }
}

/// Whether `raw` clears `threshold` given the metric's direction.
#[must_use]
pub fn passes_threshold(kind: MetricKind, raw: f64, threshold: f64) -> bool {
    match kind.direction() {
        Direction::HighIsGood => raw >= threshold,
        Direction::LowIsGood => raw <= threshold,
        Direction::NearValue(target) => (raw - target).abs() <= threshold,
    }
}

/// Free-text explanation for a metric's result, used in `Contenders,-*.txt`.
#[must_use]
pub fn describe(kind: MetricKind, raw: f64, threshold: f64, passed: bool) -> String {
    let verdict = if passed { "within" } else { "outside" };
    match kind.direction() {
        Direction::HighIsGood => {
            format!("{} = {raw:.4}, {verdict} threshold (>= {threshold:.4})", kind.label())
        }
        Direction::LowIsGood => {
            format!("{} = {raw:.4}, {verdict} threshold (<= {threshold:.4})", kind.label())
        }
        Direction::NearValue(target) => format!(
            "{} = {raw:.4}, {verdict} tolerance {threshold:.4} of target {target:.4}",
            kind.label()
        ),
    }
}

fn bit_variance(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut ones_per_bit = [0u64; 8];
    for &b in data {
        for (bit, count) in ones_per_bit.iter_mut().enumerate() {
            if (b >> bit) & 1 == 1 {
                *count += 1;
            }
        }
    }
    let total = data.len() as f64;
    let probs: Vec<f64> = ones_per_bit.iter().map(|&c| c as f64 / total).collect();
    probs.iter().sum::<f64>() / probs.len() as f64
}

fn sliding_window_similarity(data: &[u8], window: usize) -> f64 {
    if data.len() < window * 2 {
        return 0.0;
    }
    let windows: Vec<&[u8]> = data.chunks(window).filter(|c| c.len() == window).collect();
    if windows.len() < 2 {
        return 0.0;
    }
    let mut total_matches = 0usize;
    let mut total_bytes = 0usize;
    for pair in windows.windows(2) {
        total_matches += pair[0].iter().zip(pair[1]).filter(|(a, b)| a == b).count();
        total_bytes += window;
    }
    if total_bytes == 0 {
        0.0
    } else {
        total_matches as f64 / total_bytes as f64
    }
}

fn positional_bias(data: &[u8]) -> f64 {
    if data.len() < 8 {
        return 0.0;
    }
    let buckets = 8;
    let chunk_len = data.len() / buckets;
    if chunk_len == 0 {
        return 0.0;
    }
    let overall_mean = data.iter().map(|&b| f64::from(b)).sum::<f64>() / data.len() as f64;
    let mut max_dev: f64 = 0.0;
    for i in 0..buckets {
        let start = i * chunk_len;
        let end = if i == buckets - 1 { data.len() } else { start + chunk_len };
        let bucket = &data[start..end];
        let mean = bucket.iter().map(|&b| f64::from(b)).sum::<f64>() / bucket.len() as f64;
        let dev = (mean - overall_mean).abs() / 255.0;
        max_dev = max_dev.max(dev);
    }
    max_dev
}

fn hamming_ratio(a: &[u8], b: &[u8]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let bits = hamming_distance_bits(&a[..n], &b[..n]);
    f64::from(bits) / (n as f64 * 8.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avalanche_ratio_is_one_on_full_flip() {
        let a = vec![0u8; 16];
        let b = vec![0xFFu8; 16];
        assert!((hamming_ratio(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn bit_variance_of_alternating_bytes() {
        let data = vec![0xAAu8; 64]; // 10101010 repeated
        let v = bit_variance(&data);
        assert!((v - 0.5).abs() < 1e-9);
    }
}
