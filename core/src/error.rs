//! Error taxonomy for the mungelab core.
//!
//! Mirrors the severity split in the design notes: registry errors are
//! fatal (programmer error, log and abort), pipeline/analysis errors are
//! recoverable per-candidate, and persistence errors fall back to a safe
//! default with a warning.

use thiserror::Error;

/// Errors raised by the transform registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Sequence referenced an id with no registry entry.
    #[error("unknown transform id {0}")]
    UnknownTransform(u8),
    /// A transform's declared inverse id is missing from the registry.
    #[error("inverse id {0} missing from registry")]
    InverseMissing(u8),
}

/// Errors raised while running the transform pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Propagated registry lookup failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Decrypt input shorter than the fixed header.
    #[error("ciphertext truncated: expected at least {expected} bytes, got {got}")]
    TruncatedCiphertext {
        /// Minimum required length.
        expected: usize,
        /// Actual length supplied.
        got: usize,
    },
    /// Ciphertext header magic bytes did not match.
    #[error("ciphertext header magic mismatch")]
    BadMagic,
    /// Sequence, round, or input argument outside its valid domain.
    #[error("argument error: {0}")]
    Argument(#[from] ArgumentError),
}

/// Errors raised while scoring ciphertext via the cryptanalysis engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Input buffers required for a metric were empty or mismatched in length.
    #[error("invalid analysis input: {0}")]
    InvalidInput(String),
}

/// Errors raised while loading or saving persisted state.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The on-disk CutList JSON failed to parse.
    #[error("cutlist file malformed: {0}")]
    CutListMalformed(String),
    /// The on-disk checkpoint JSON failed to parse.
    #[error("state file corrupt: {0}")]
    StateFileCorrupt(String),
    /// Filesystem I/O failure while reading or writing persisted state.
    #[error("persistence I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON (de)serialization failure.
    #[error("persistence serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Integrity-verification failure between the three CutList views.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cutlist views disagree for key {key}: {detail}")]
pub struct CutListInconsistent {
    /// The `(level, pass_count, data_type)` key under dispute.
    pub key: String,
    /// Human-readable description of the mismatch.
    pub detail: String,
}

/// Errors raised by a search driver (Munge / BTR / Best-Fit).
#[derive(Debug, Error)]
pub enum SearchError {
    /// Propagated pipeline failure for a candidate.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    /// Propagated analysis failure for a candidate.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    /// Propagated persistence failure (recovered by the caller).
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// Non-fatal bootstrap-only integrity mismatch.
    #[error(transparent)]
    CutListInconsistent(#[from] CutListInconsistent),
}

/// Argument / input validation error surfaced to a caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// A rounds value fell outside `[1, 9]`.
    #[error("rounds value {0} outside valid range [1, 9]")]
    RoundsOutOfRange(u32),
    /// The pipeline was asked to encrypt/decrypt an empty sequence.
    #[error("sequence must contain at least one transform")]
    EmptySequence,
    /// The pipeline was asked to encrypt/decrypt empty input.
    #[error("input buffer must not be empty")]
    EmptyInput,
    /// A sequence text form failed to parse.
    #[error("could not parse sequence text: {0}")]
    UnparsableSequence(String),
    /// An enum flag value did not match any known variant.
    #[error("unknown value {value} for flag {flag}")]
    UnknownEnumValue {
        /// Flag name, e.g. `"ScoringMode"`.
        flag: String,
        /// The value the caller supplied.
        value: String,
    },
}
