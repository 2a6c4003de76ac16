//! Filename grammar shared by `Contenders`, `State`, and `MungeFailDB`
//! artifacts (`spec.md` §6): `-L<level>-P<pass>-D<C|N|R|S|U>-M<C|E|F|N>-S<P|M>`,
//! case-insensitive.

use crate::analysis::{OperationMode, ScoringMode};
use crate::profiler::InputType;

/// One run's identifying coordinates, encoded into every artifact filename
/// for that run so a restored state, contenders listing, and fail-db all
/// agree on which run produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunCoordinates {
    /// Search depth (sequence length) this artifact covers.
    pub level: u32,
    /// Configured minimum pass count.
    pub pass_count: u32,
    /// Input classification.
    pub data_type: InputType,
    /// Active cryptanalysis weight-table mode.
    pub mode: OperationMode,
    /// Active aggregate-scoring algorithm.
    pub scoring_mode: ScoringMode,
}

impl RunCoordinates {
    /// Render the grammar suffix, e.g. `-L5-P6-DC-MN-SP`.
    #[must_use]
    pub fn suffix(self) -> String {
        format!(
            "-L{}-P{}-D{}-M{}-S{}",
            self.level,
            self.pass_count,
            self.data_type.letter(),
            self.mode.letter(),
            self.scoring_mode.name().chars().next().unwrap_or('P')
        )
    }
}

/// Build `Contenders,-L{L}-P{P}-D{D}-M{M}-S{S}.txt` for `coords`.
#[must_use]
pub fn contenders_filename(coords: RunCoordinates) -> String {
    format!("Contenders,{}.txt", coords.suffix())
}

/// Build `State,-L{L}-P{P}-D{D}-M{M}-S{S}.json` for `coords`.
#[must_use]
pub fn state_filename(coords: RunCoordinates) -> String {
    format!("State,{}.json", coords.suffix())
}

/// Build `MungeFailDB,-L{L}-P{P}-D{D}-M{M}-S{S}.db` for `coords`.
#[must_use]
pub fn munge_fail_db_filename(coords: RunCoordinates) -> String {
    format!("MungeFailDB,{}.db", coords.suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunCoordinates {
        RunCoordinates {
            level: 5,
            pass_count: 6,
            data_type: InputType::Combined,
            mode: OperationMode::None,
            scoring_mode: ScoringMode::Practical,
        }
    }

    #[test]
    fn suffix_matches_grammar() {
        assert_eq!(sample().suffix(), "-L5-P6-DC-MN-SP");
    }

    #[test]
    fn contenders_filename_matches_spec_pattern() {
        assert_eq!(contenders_filename(sample()), "Contenders,-L5-P6-DC-MN-SP.txt");
    }

    #[test]
    fn state_and_faildb_share_the_same_suffix() {
        let coords = sample();
        assert!(state_filename(coords).contains(&coords.suffix()));
        assert!(munge_fail_db_filename(coords).contains(&coords.suffix()));
    }
}
