//! Declarative settings schema and the concrete `Globals` snapshot.
//!
//! Re-architecture note (`SPEC_FULL.md` §9): the source's reflection-driven
//! settings object becomes a flat table of `{ name, kind, default, flags }`
//! entries that drives load/save/list without any runtime reflection —
//! [`Globals::to_entries`] and [`Globals::apply_entry`] are the only two
//! places that know the field list, and both are plain `match` arms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::OperationMode;
use crate::analysis::ScoringMode;
use crate::error::ArgumentError;
use crate::profiler::InputType;

/// A single settings value. Kept deliberately small: the whole schema is
/// ints, a handful of enums (modeled as strings), and bools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Integer-valued setting (rounds, pass count, contenders, ...).
    Int(i64),
    /// String/enum-valued setting (InputType, Mode, ScoringMode).
    Str(String),
    /// Boolean flag.
    Bool(bool),
}

/// Persistence behavior for one settings entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingFlags {
    /// Written to `GlobalSettings.json` on save.
    pub persist: bool,
    /// Internal-only; never exposed to the CLI settings listing.
    pub internal: bool,
    /// Never written, even when `persist` is true (runtime-only override).
    pub no_save: bool,
}

impl SettingFlags {
    const STANDARD: Self = Self { persist: true, internal: false, no_save: false };
    const RUNTIME_ONLY: Self = Self { persist: true, internal: false, no_save: true };
}

/// One row of the declarative settings schema.
#[derive(Debug, Clone)]
pub struct SettingSchemaEntry {
    /// Canonical flag name, e.g. `"Rounds"`.
    pub name: &'static str,
    /// Default value if never set.
    pub default: SettingValue,
    /// Persistence behavior.
    pub flags: SettingFlags,
}

/// The full declarative schema, in canonical CLI order.
#[must_use]
pub fn schema() -> Vec<SettingSchemaEntry> {
    vec![
        SettingSchemaEntry { name: "Rounds", default: SettingValue::Int(1), flags: SettingFlags::STANDARD },
        SettingSchemaEntry {
            name: "MaxSequenceLen",
            default: SettingValue::Int(4),
            flags: SettingFlags::STANDARD,
        },
        SettingSchemaEntry {
            name: "InputType",
            default: SettingValue::Str("Combined".into()),
            flags: SettingFlags::STANDARD,
        },
        SettingSchemaEntry { name: "PassCount", default: SettingValue::Int(6), flags: SettingFlags::STANDARD },
        SettingSchemaEntry {
            name: "DesiredContenders",
            default: SettingValue::Int(1000),
            flags: SettingFlags::STANDARD,
        },
        SettingSchemaEntry {
            name: "FlushThreshold",
            default: SettingValue::Int(10_000),
            flags: SettingFlags::STANDARD,
        },
        SettingSchemaEntry {
            name: "ScoringMode",
            default: SettingValue::Str("Practical".into()),
            flags: SettingFlags::STANDARD,
        },
        SettingSchemaEntry {
            name: "Mode",
            default: SettingValue::Str("None".into()),
            flags: SettingFlags::STANDARD,
        },
        SettingSchemaEntry { name: "Quiet", default: SettingValue::Bool(false), flags: SettingFlags::RUNTIME_ONLY },
        SettingSchemaEntry {
            name: "SqlCompact",
            default: SettingValue::Bool(false),
            flags: SettingFlags::STANDARD,
        },
        SettingSchemaEntry {
            name: "CreateMungeFailDB",
            default: SettingValue::Bool(false),
            flags: SettingFlags::STANDARD,
        },
        SettingSchemaEntry {
            name: "ExitJobComplete",
            default: SettingValue::Bool(false),
            flags: SettingFlags::RUNTIME_ONLY,
        },
        SettingSchemaEntry {
            name: "LogMungeOutput",
            default: SettingValue::Bool(false),
            flags: SettingFlags::STANDARD,
        },
    ]
}

/// Concrete, typed snapshot of every setting — what an [`crate::env::ExecutionEnvironment`]
/// actually carries and what `GlobalSettings.json` actually persists.
#[derive(Debug, Clone, PartialEq)]
pub struct Globals {
    /// Global rounds applied by default when not overridden by a profile.
    pub rounds: u32,
    /// Maximum sequence length Munge will search.
    pub max_sequence_len: usize,
    /// Default input classification used when no buffer is supplied.
    pub input_type: InputType,
    /// Minimum number of metrics a candidate must pass to be considered.
    pub pass_count: u32,
    /// Top-K capacity for the contender registry.
    pub desired_contenders: usize,
    /// Candidates considered between checkpoint flushes.
    pub flush_threshold: u64,
    /// Active scoring mode (Practical or Metric).
    pub scoring_mode: ScoringMode,
    /// Active cryptanalysis weight-table selector.
    pub mode: OperationMode,
    /// Suppress non-essential console output.
    pub quiet: bool,
    /// Emit compact SQL-friendly contender output.
    pub sql_compact: bool,
    /// Write rejected candidates to the optional SQLite fail database.
    pub create_munge_fail_db: bool,
    /// Exit the process once the driver reports job completion.
    pub exit_job_complete: bool,
    /// Log dropped (non-reversible) candidates during Munge runs.
    pub log_munge_output: bool,
}

impl Default for Globals {
    fn default() -> Self {
        Self {
            rounds: 1,
            max_sequence_len: 4,
            input_type: InputType::Combined,
            pass_count: 6,
            desired_contenders: 1000,
            flush_threshold: 10_000,
            scoring_mode: ScoringMode::Practical,
            mode: OperationMode::None,
            quiet: false,
            sql_compact: false,
            create_munge_fail_db: false,
            exit_job_complete: false,
            log_munge_output: false,
        }
    }
}

impl Globals {
    /// Flatten into a name -> value map, honoring each entry's `no_save` flag.
    #[must_use]
    pub fn to_entries(&self, include_no_save: bool) -> BTreeMap<String, SettingValue> {
        let mut map = BTreeMap::new();
        let raw: &[(&str, SettingValue, bool)] = &[
            ("Rounds", SettingValue::Int(i64::from(self.rounds)), false),
            ("MaxSequenceLen", SettingValue::Int(self.max_sequence_len as i64), false),
            ("InputType", SettingValue::Str(input_type_name(self.input_type).into()), false),
            ("PassCount", SettingValue::Int(i64::from(self.pass_count)), false),
            ("DesiredContenders", SettingValue::Int(self.desired_contenders as i64), false),
            ("FlushThreshold", SettingValue::Int(self.flush_threshold as i64), false),
            ("ScoringMode", SettingValue::Str(self.scoring_mode.name().into()), false),
            ("Mode", SettingValue::Str(self.mode.name().into()), false),
            ("Quiet", SettingValue::Bool(self.quiet), true),
            ("SqlCompact", SettingValue::Bool(self.sql_compact), false),
            ("CreateMungeFailDB", SettingValue::Bool(self.create_munge_fail_db), false),
            ("ExitJobComplete", SettingValue::Bool(self.exit_job_complete), true),
            ("LogMungeOutput", SettingValue::Bool(self.log_munge_output), false),
        ];
        for (name, value, no_save) in raw {
            if *no_save && !include_no_save {
                continue;
            }
            map.insert((*name).to_string(), value.clone());
        }
        map
    }

    /// Apply one `(name, value)` pair, validating as needed.
    ///
    /// # Errors
    /// Returns [`ArgumentError::UnknownEnumValue`] for an unrecognized
    /// setting name or an enum value that does not match any known variant.
    pub fn apply_entry(&mut self, name: &str, value: &SettingValue) -> Result<(), ArgumentError> {
        match (name, value) {
            ("Rounds", SettingValue::Int(v)) => self.rounds = *v as u32,
            ("MaxSequenceLen", SettingValue::Int(v)) => self.max_sequence_len = *v as usize,
            ("InputType", SettingValue::Str(v)) => self.input_type = parse_input_type(v)?,
            ("PassCount", SettingValue::Int(v)) => self.pass_count = *v as u32,
            ("DesiredContenders", SettingValue::Int(v)) => self.desired_contenders = *v as usize,
            ("FlushThreshold", SettingValue::Int(v)) => self.flush_threshold = *v as u64,
            ("ScoringMode", SettingValue::Str(v)) => {
                self.scoring_mode = ScoringMode::parse(v).ok_or_else(|| {
                    ArgumentError::UnknownEnumValue { flag: "ScoringMode".into(), value: v.clone() }
                })?;
            }
            ("Mode", SettingValue::Str(v)) => {
                self.mode = OperationMode::parse(v).ok_or_else(|| ArgumentError::UnknownEnumValue {
                    flag: "Mode".into(),
                    value: v.clone(),
                })?;
            }
            ("Quiet", SettingValue::Bool(v)) => self.quiet = *v,
            ("SqlCompact", SettingValue::Bool(v)) => self.sql_compact = *v,
            ("CreateMungeFailDB", SettingValue::Bool(v)) => self.create_munge_fail_db = *v,
            ("ExitJobComplete", SettingValue::Bool(v)) => self.exit_job_complete = *v,
            ("LogMungeOutput", SettingValue::Bool(v)) => self.log_munge_output = *v,
            (other, _) => {
                return Err(ArgumentError::UnknownEnumValue {
                    flag: other.to_string(),
                    value: format!("{value:?}"),
                })
            }
        }
        Ok(())
    }
}

fn input_type_name(ty: InputType) -> &'static str {
    match ty {
        InputType::Combined => "Combined",
        InputType::Natural => "Natural",
        InputType::Random => "Random",
        InputType::Sequence => "Sequence",
        InputType::UserData => "UserData",
    }
}

fn parse_input_type(v: &str) -> Result<InputType, ArgumentError> {
    match v {
        "Combined" => Ok(InputType::Combined),
        "Natural" => Ok(InputType::Natural),
        "Random" => Ok(InputType::Random),
        "Sequence" => Ok(InputType::Sequence),
        "UserData" => Ok(InputType::UserData),
        other => Err(ArgumentError::UnknownEnumValue { flag: "InputType".into(), value: other.into() }),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn round_trips_through_entries() {
        let globals = Globals::default();
        let entries = globals.to_entries(true);
        let mut restored = Globals::default();
        for (name, value) in &entries {
            restored.apply_entry(name, value).unwrap();
        }
        assert_eq!(globals, restored);
    }

    #[test]
    fn no_save_entries_are_excluded_by_default() {
        let globals = Globals::default();
        let entries = globals.to_entries(false);
        assert!(!entries.contains_key("Quiet"));
        assert!(!entries.contains_key("ExitJobComplete"));
    }

    #[test]
    fn unknown_setting_name_errors() {
        let mut globals = Globals::default();
        assert!(globals.apply_entry("NotReal", &SettingValue::Bool(true)).is_err());
    }
}
