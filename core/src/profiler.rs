//! Input Profiler (component B).
//!
//! Classifies an arbitrary byte buffer into one of four natural categories
//! using a finite-state sampling model over a sliding window, then returns
//! the canonical [`InputProfile`] baked in for that category.

use crate::sequence::SequenceStep;
use crate::statutil::{autocorrelation_peak, byte_deviation_from_uniform, shannon_entropy};

/// The four natural classifications plus the caller-supplied escape hatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputType {
    /// No class dominates the windowed scan.
    Combined,
    /// Text-like: high alpha/whitespace fraction, low-to-moderate entropy.
    Natural,
    /// High-entropy, low-redundancy data.
    Random,
    /// Monotone-stride data (counters, ramps, sorted runs).
    Sequence,
    /// Caller supplied their own sequence/global_rounds; never produced by
    /// classification itself.
    UserData,
}

impl InputType {
    /// Single-letter filename code from `spec.md` §6's grammar (`-D<C|N|R|S|U>`).
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Combined => 'C',
            Self::Natural => 'N',
            Self::Random => 'R',
            Self::Sequence => 'S',
            Self::UserData => 'U',
        }
    }
}

/// Canonical `(sequence, global_rounds)` for a classified input category.
#[derive(Debug, Clone)]
pub struct InputProfile {
    /// Which category this profile represents.
    pub name: InputType,
    /// Ordered transform steps.
    pub sequence: Vec<SequenceStep>,
    /// Number of times the whole sequence is applied.
    pub global_rounds: u32,
}

const WINDOW_SIZE: usize = 1024;
const WINDOW_STRIDE: usize = 512;

const MAGIC_TABLE: &[(&[u8], InputType)] = &[
    (b"%PDF", InputType::Natural),
    (b"PK\x03\x04", InputType::Random),
    (b"MZ\x90\x00", InputType::Random),
    (b"<htm", InputType::Natural),
    (b"<!DO", InputType::Natural),
    (b"\xFF\xD8\xFF\xE0", InputType::Combined), // JPEG
    (b"\x89PNG", InputType::Combined),
    (b"\x1A\x45\xDF\xA3", InputType::Combined), // MKV (EBML)
    (b"RIFF", InputType::Combined),             // WAV container
    (b"\xD0\xCF\x11\xE0", InputType::Random),   // legacy MSI/OLE2
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowClass {
    Sequence,
    Natural,
    Random,
    Other,
}

fn step(id: u8, rounds: u32) -> SequenceStep {
    SequenceStep { transform_id: id, rounds }
}

/// Steps baked in per classification; see `SPEC_FULL.md` §4.B supplement.
pub mod canonical {
    use super::step;
    use crate::sequence::SequenceStep;

    /// Combined-class canonical sequence.
    #[must_use]
    pub fn combined() -> (Vec<SequenceStep>, u32) {
        (vec![step(11, 1), step(15, 2), step(4, 1)], 3)
    }

    /// Natural-class canonical sequence.
    #[must_use]
    pub fn natural() -> (Vec<SequenceStep>, u32) {
        (vec![step(1, 1), step(11, 1), step(7, 1)], 2)
    }

    /// Random-class canonical sequence.
    #[must_use]
    pub fn random() -> (Vec<SequenceStep>, u32) {
        (vec![step(21, 1), step(9, 2), step(15, 1), step(1, 1)], 4)
    }

    /// Sequence-class canonical sequence.
    #[must_use]
    pub fn sequence() -> (Vec<SequenceStep>, u32) {
        (vec![step(17, 1), step(11, 1)], 2)
    }
}

/// Classify `data` and return its canonical profile.
#[must_use]
pub fn profile(data: &[u8]) -> InputProfile {
    let name = classify(data);
    profile_for(name)
}

/// Build the canonical profile for an already-known classification.
#[must_use]
pub fn profile_for(name: InputType) -> InputProfile {
    let (sequence, global_rounds) = match name {
        InputType::Combined | InputType::UserData => canonical::combined(),
        InputType::Natural => canonical::natural(),
        InputType::Random => canonical::random(),
        InputType::Sequence => canonical::sequence(),
    };
    InputProfile { name, sequence, global_rounds }
}

/// Wrap a caller-supplied sequence as a `UserData` profile, preserving the
/// caller's existing global_rounds exactly as given.
#[must_use]
pub fn user_data_profile(sequence: Vec<SequenceStep>, global_rounds: u32) -> InputProfile {
    InputProfile { name: InputType::UserData, sequence, global_rounds }
}

/// Classify `data` into one of the four natural categories (never `UserData`).
#[must_use]
pub fn classify(data: &[u8]) -> InputType {
    if data.len() >= 4 {
        for (magic, ty) in MAGIC_TABLE {
            if data.starts_with(magic) {
                return *ty;
            }
        }
    }

    if data.is_empty() {
        return InputType::Combined;
    }

    let mut sequence_windows = 0usize;
    let mut natural_windows = 0usize;
    let mut random_windows = 0usize;
    let mut other_windows = 0usize;
    let mut total_windows = 0usize;

    let mut start = 0usize;
    loop {
        let end = (start + WINDOW_SIZE).min(data.len());
        let window = &data[start..end];
        if window.len() >= 16 {
            total_windows += 1;
            match classify_window(window) {
                WindowClass::Sequence => sequence_windows += 1,
                WindowClass::Natural => natural_windows += 1,
                WindowClass::Random => random_windows += 1,
                WindowClass::Other => other_windows += 1,
            }
        }
        if end == data.len() {
            break;
        }
        start += WINDOW_STRIDE;
    }
    let _ = other_windows;

    aggregate(sequence_windows, natural_windows, random_windows, total_windows)
}

fn aggregate(seq_w: usize, nat_w: usize, rand_w: usize, total: usize) -> InputType {
    if total == 0 {
        return InputType::Combined;
    }
    let total = total as f64;
    let seq_frac = seq_w as f64 / total;
    let nat_frac = nat_w as f64 / total;
    let rand_frac = rand_w as f64 / total;

    if seq_frac > 0.8 {
        return InputType::Sequence;
    }
    if nat_frac > 0.8 {
        return InputType::Natural;
    }
    if rand_frac > 0.8 {
        return InputType::Random;
    }

    let classes_at_or_above_10pct =
        [seq_frac, nat_frac, rand_frac].iter().filter(|&&f| f >= 0.1).count();
    if classes_at_or_above_10pct >= 2 {
        return InputType::Combined;
    }

    // Weighted scores, per `spec.md` §4.B step 3.
    let sequence_score = 3.0 * seq_w as f64;
    let natural_score = 2.0 * nat_w as f64;
    let random_score = rand_w as f64;
    let max_score = sequence_score.max(natural_score).max(random_score);
    if max_score <= 0.0 {
        InputType::Combined
    } else if (max_score - sequence_score).abs() < f64::EPSILON {
        InputType::Sequence
    } else if (max_score - natural_score).abs() < f64::EPSILON {
        InputType::Natural
    } else {
        InputType::Random
    }
}

fn classify_window(window: &[u8]) -> WindowClass {
    if check_sequence(window) {
        return WindowClass::Sequence;
    }
    let alpha_white = fraction_alpha_or_space(window);
    if alpha_white > 0.90 {
        return WindowClass::Natural;
    }
    let entropy = shannon_entropy(window);
    if entropy > 7.5 {
        return WindowClass::Random;
    }
    if entropy < 6.5 {
        return WindowClass::Natural;
    }
    let rle_ratio = rle_compression_ratio(window);
    if rle_ratio <= 0.5 {
        return WindowClass::Natural;
    }
    full_analysis(window)
}

/// Monotone stride detection within tolerance +-2 across the whole window.
fn check_sequence(window: &[u8]) -> bool {
    if window.len() < 3 {
        return false;
    }
    let stride = i32::from(window[1]) - i32::from(window[0]);
    let mut matches = 0usize;
    let pairs = window.len() - 1;
    for pair in window.windows(2) {
        let diff = i32::from(pair[1]) - i32::from(pair[0]);
        if (diff - stride).abs() <= 2 {
            matches += 1;
        }
    }
    matches as f64 / pairs as f64 >= 0.95
}

fn fraction_alpha_or_space(window: &[u8]) -> f64 {
    let count = window
        .iter()
        .filter(|&&b| b == b' ' || b.is_ascii_lowercase())
        .count();
    count as f64 / window.len() as f64
}

/// Simple run-length compression ratio: encoded size / original size using
/// a byte+count RLE scheme. Lower ratio means more redundancy.
fn rle_compression_ratio(window: &[u8]) -> f64 {
    if window.is_empty() {
        return 1.0;
    }
    let mut encoded_units = 0usize;
    let mut i = 0usize;
    while i < window.len() {
        let mut run = 1usize;
        while i + run < window.len() && window[i + run] == window[i] && run < 255 {
            run += 1;
        }
        encoded_units += 1;
        i += run;
    }
    (encoded_units * 2) as f64 / window.len() as f64
}

/// `FullAnalysis` state: periodicity, uniqueness, byte-deviation, and
/// first-half/second-half similarity, combined into a final guess.
fn full_analysis(window: &[u8]) -> WindowClass {
    let unique_ratio = {
        let mut seen = [false; 256];
        let mut count = 0usize;
        for &b in window {
            if !seen[b as usize] {
                seen[b as usize] = true;
                count += 1;
            }
        }
        count as f64 / 256.0
    };

    let periodicity = autocorrelation_peak(window, 64);
    let deviation = byte_deviation_from_uniform(window);
    let similarity = sliding_window_similarity(window);

    if periodicity > 0.3 || similarity > 0.6 {
        return WindowClass::Other;
    }
    if unique_ratio < 0.4 {
        return WindowClass::Natural;
    }
    if deviation < 0.15 {
        return WindowClass::Random;
    }
    WindowClass::Other
}

fn sliding_window_similarity(window: &[u8]) -> f64 {
    let half = window.len() / 2;
    if half == 0 {
        return 0.0;
    }
    let matches = window[..half]
        .iter()
        .zip(&window[window.len() - half..])
        .filter(|(a, b)| a == b)
        .count();
    matches as f64 / half as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotone_ramp_classifies_as_sequence() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 256) as u8).collect();
        assert_eq!(classify(&data), InputType::Sequence);
    }

    #[test]
    fn lowercase_text_classifies_as_natural() {
        let data = "the quick brown fox jumps over the lazy dog again and again "
            .repeat(80)
            .into_bytes();
        assert_eq!(classify(&data), InputType::Natural);
    }

    #[test]
    fn random_bytes_classify_as_random() {
        let mut state = 0x243F_6A88_85A3_08D3u64;
        let data: Vec<u8> = (0..4096)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state & 0xFF) as u8
            })
            .collect();
        assert_eq!(classify(&data), InputType::Random);
    }

    #[test]
    fn magic_shortcut_short_circuits() {
        let mut zip = b"PK\x03\x04".to_vec();
        zip.extend(std::iter::repeat(0u8).take(64));
        assert_eq!(classify(&zip), InputType::Random);
    }

    #[test]
    fn user_data_preserves_caller_global_rounds() {
        let profile = user_data_profile(vec![SequenceStep { transform_id: 1, rounds: 1 }], 6);
        assert_eq!(profile.global_rounds, 6);
        assert_eq!(profile.name, InputType::UserData);
    }
}
