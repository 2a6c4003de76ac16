//! Per-mode metric weight tables (§4.D "Weight tables are data, not behavior").

/// Selects which weight table the engine applies. Persisted in
/// `Globals::mode` and settable via `-Mode {Cryptographic|Exploratory|
/// Flattening|None}` (`spec.md` §6). Each variant's single-letter filename
/// code (`spec.md` §6 filename grammar, `-M<C|E|F|N>`) is its [`letter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationMode {
    /// No bias; every metric weighted equally.
    None,
    /// Favor entropy, periodicity, and diffusion metrics — block-cipher-grade
    /// output quality.
    Cryptographic,
    /// Revised `Cryptographic` weighting; sharper avalanche/key-dependency
    /// emphasis, same filename letter as `Cryptographic` (the filename
    /// grammar in `spec.md` §6 has no separate `_New` letter).
    CryptographicNew,
    /// Lenient, balanced weighting for broad Munge/Best-Fit exploration.
    Exploratory,
    /// Revised `Exploratory` weighting; mild bias toward entropy and
    /// avalanche over the flat table, same filename letter as `Exploratory`.
    ExploratoryNew,
    /// Favor byte-histogram uniformity and positional balance — flattening
    /// structured input toward a uniform distribution.
    Flattening,
}

/// The four filename-distinguishable modes (`spec.md` §6 grammar `-M<C|E|F|N>`),
/// in declaration order. [`OperationMode::CryptographicNew`] and
/// [`OperationMode::ExploratoryNew`] share a letter with their base mode and
/// so are reachable only by name, not by this list.
pub const ALL_MODES: [OperationMode; 4] =
    [OperationMode::None, OperationMode::Cryptographic, OperationMode::Exploratory, OperationMode::Flattening];

/// Every mode, including the letter-sharing `_New` variants, in declaration
/// order. Used for exhaustive iteration (CLI `--list-modes`, tests).
pub const ALL_MODES_INCLUDING_NEW: [OperationMode; 6] = [
    OperationMode::None,
    OperationMode::Cryptographic,
    OperationMode::CryptographicNew,
    OperationMode::Exploratory,
    OperationMode::ExploratoryNew,
    OperationMode::Flattening,
];

impl OperationMode {
    /// Canonical name used in settings (`-Mode=<name>`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Cryptographic => "Cryptographic",
            Self::CryptographicNew => "Cryptographic_New",
            Self::Exploratory => "Exploratory",
            Self::ExploratoryNew => "Exploratory_New",
            Self::Flattening => "Flattening",
        }
    }

    /// Single-letter filename code from `spec.md` §6's grammar (`-M<C|E|F|N>`).
    /// The `_New` variants share their base mode's letter.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::None => 'N',
            Self::Cryptographic | Self::CryptographicNew => 'C',
            Self::Exploratory | Self::ExploratoryNew => 'E',
            Self::Flattening => 'F',
        }
    }

    /// Parse a canonical name, case-insensitively. A bare single-letter
    /// filename code resolves to the base mode only — `_New` variants are
    /// name-addressable but not letter-addressable, mirroring the
    /// filename grammar's lack of a distinct code for them.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(c) = s.chars().next().filter(|_| s.len() == 1) {
            let c = c.to_ascii_uppercase();
            return ALL_MODES.iter().copied().find(|m| m.letter() == c);
        }
        ALL_MODES_INCLUDING_NEW.iter().copied().find(|m| m.name().eq_ignore_ascii_case(s))
    }

    /// The nine-element weight vector for this mode, indexed by
    /// [`crate::analysis::MetricKind`] discriminant.
    #[must_use]
    pub const fn weights(self) -> [f64; 9] {
        // Order: Entropy, BitVariance, SlidingWindow, FrequencyDistribution,
        // PeriodicityCheck, MangosCorrelation, PositionalMapping,
        // AvalancheScore, KeyDependency.
        match self {
            Self::None => [1.0; 9],
            Self::Cryptographic => [2.0, 1.0, 1.5, 1.0, 1.5, 1.0, 1.0, 2.0, 2.0],
            Self::CryptographicNew => [2.0, 1.0, 1.5, 1.0, 1.5, 1.0, 1.0, 2.5, 2.5],
            Self::Exploratory => [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            Self::ExploratoryNew => [1.3, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.3, 1.0],
            Self::Flattening => [1.5, 1.5, 0.5, 3.0, 0.5, 0.5, 2.0, 0.5, 0.5],
        }
    }
}

/// Default pass/fail thresholds, shared by every [`OperationMode`] under
/// Practical scoring. Indexed by [`crate::analysis::MetricKind`] discriminant.
#[must_use]
pub const fn practical_thresholds() -> [f64; 9] {
    [
        7.5,  // Entropy: pass if >= 7.5 bits/byte
        0.02, // BitVariance: pass if within 0.02 of 0.5
        0.08, // SlidingWindow: pass if <= 0.08 local-match fraction
        0.15, // FrequencyDistribution: pass if <= 0.15 RMS deviation
        0.25, // PeriodicityCheck: pass if <= 0.25 autocorrelation peak
        0.10, // MangosCorrelation: pass if <= 0.10 |pearson r|
        0.08, // PositionalMapping: pass if <= 0.08 max bucket deviation
        0.10, // AvalancheScore: pass if within 0.10 of 0.5 hamming ratio
        0.10, // KeyDependency: pass if within 0.10 of 0.5 hamming ratio
    ]
}

/// Range `[floor, ceiling]` each metric is rescaled against under Metric
/// scoring (Decision D2 in `DESIGN.md`). Indexed by discriminant.
#[must_use]
pub const fn metric_ranges() -> [(f64, f64); 9] {
    [
        (0.0, 8.0), // Entropy
        (0.0, 0.5), // BitVariance (distance from 0.5, so 0 is best)
        (0.0, 1.0), // SlidingWindow
        (0.0, 1.0), // FrequencyDistribution
        (0.0, 1.0), // PeriodicityCheck
        (0.0, 1.0), // MangosCorrelation
        (0.0, 1.0), // PositionalMapping
        (0.0, 0.5), // AvalancheScore (distance from 0.5)
        (0.0, 0.5), // KeyDependency (distance from 0.5)
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_roundtrips_through_parse() {
        for mode in ALL_MODES {
            assert_eq!(OperationMode::parse(mode.name()), Some(mode));
        }
    }

    #[test]
    fn letter_code_roundtrips_through_parse() {
        for mode in ALL_MODES {
            let letter = mode.letter().to_string();
            assert_eq!(OperationMode::parse(&letter), Some(mode));
        }
    }

    #[test]
    fn none_mode_is_unweighted() {
        assert_eq!(OperationMode::None.weights(), [1.0; 9]);
    }

    #[test]
    fn new_variants_resolve_by_name_not_by_letter() {
        assert_eq!(OperationMode::parse("Cryptographic_New"), Some(OperationMode::CryptographicNew));
        assert_eq!(OperationMode::parse("Exploratory_New"), Some(OperationMode::ExploratoryNew));
        // The bare letter always resolves to the base mode, matching the
        // filename grammar's single `C`/`E` code.
        assert_eq!(OperationMode::parse("C"), Some(OperationMode::Cryptographic));
        assert_eq!(OperationMode::CryptographicNew.letter(), 'C');
    }
}
