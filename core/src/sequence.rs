//! Sequence data model and canonical text-form persistence (components 3 and 4.I).

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::ArgumentError;
use crate::registry::TransformRegistry;
use crate::transforms::catalog;

/// Minimum and maximum allowed rounds value (both per-transform and global).
pub const MIN_ROUNDS: u32 = 1;
/// See [`MIN_ROUNDS`].
pub const MAX_ROUNDS: u32 = 9;

/// Clamp-checks a rounds value against `[MIN_ROUNDS, MAX_ROUNDS]`.
///
/// # Errors
/// Returns [`ArgumentError::RoundsOutOfRange`] if out of range.
pub fn validate_rounds(value: u32) -> Result<u32, ArgumentError> {
    if (MIN_ROUNDS..=MAX_ROUNDS).contains(&value) {
        Ok(value)
    } else {
        Err(ArgumentError::RoundsOutOfRange(value))
    }
}

/// One `(transform_id, per_transform_rounds)` entry in a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceStep {
    /// Registry id of the transform applied at this position.
    pub transform_id: u8,
    /// Number of times this transform is iterated per global round.
    pub rounds: u32,
}

/// An ordered list of transform steps plus a global rounds attribute — the
/// thing the search drivers discover and the pipeline executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    /// Ordered transform steps.
    pub steps: Vec<SequenceStep>,
    /// Number of times the whole sequence is applied.
    pub global_rounds: u32,
}

impl Sequence {
    /// Build a sequence from `(id, rounds)` pairs and a global rounds value.
    ///
    /// # Errors
    /// Returns [`ArgumentError`] if the sequence is empty or any rounds
    /// value is out of `[MIN_ROUNDS, MAX_ROUNDS]`.
    pub fn new(steps: Vec<(u8, u32)>, global_rounds: u32) -> Result<Self, ArgumentError> {
        if steps.is_empty() {
            return Err(ArgumentError::EmptySequence);
        }
        let global_rounds = validate_rounds(global_rounds)?;
        let steps = steps
            .into_iter()
            .map(|(transform_id, rounds)| {
                validate_rounds(rounds).map(|rounds| SequenceStep { transform_id, rounds })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps, global_rounds })
    }

    /// Number of transform steps in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True if the sequence has no steps (never constructed by [`Sequence::new`],
    /// but reachable via deserialization of external state files).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Reverse the sequence and replace every id with its registry inverse —
    /// the decrypt-side transform order (§4.C).
    ///
    /// # Errors
    /// Returns [`crate::error::RegistryError`] if any id is unregistered.
    pub fn inverted(&self, registry: &TransformRegistry) -> Result<Self, crate::error::RegistryError> {
        let mut steps = Vec::with_capacity(self.steps.len());
        for step in self.steps.iter().rev() {
            let inverse_id = registry.inverse_id(step.transform_id)?;
            steps.push(SequenceStep { transform_id: inverse_id, rounds: step.rounds });
        }
        Ok(Self { steps, global_rounds: self.global_rounds })
    }

    /// Flags controlling which optional attributes [`Sequence::serialize`] emits.
    pub fn serialize(&self, opts: SerializeOptions, registry: &TransformRegistry) -> String {
        let mut out = String::new();
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                out.push_str(" -> ");
            }
            let name = catalog::name_for_id(step.transform_id).unwrap_or("Unknown");
            out.push_str(name);
            if opts.include_id {
                let _ = write!(out, "(ID:{})", step.transform_id);
            }
            if opts.include_rounds {
                let _ = write!(out, "(TR:{})", step.rounds);
            }
        }
        let _ = registry; // reserved for future name-collision disambiguation
        if opts.include_right_side_attributes {
            let _ = write!(out, " | (GR:{})", self.global_rounds);
        }
        out
    }

    /// Parse the canonical text form described in `SPEC_FULL.md` §4.I.
    ///
    /// Accepts the subset grammar: `(ID:n)` may be omitted if the name
    /// resolves uniquely in the registry, `(TR:n)` defaults to 1, and the
    /// trailing `| (GR:n)` defaults to `default_global_rounds` if absent.
    ///
    /// # Errors
    /// Returns [`ArgumentError::UnparsableSequence`] on any malformed step,
    /// or a rounds/empty-sequence error from [`Sequence::new`].
    pub fn parse(text: &str, default_global_rounds: u32) -> Result<Self, ArgumentError> {
        let (body, gr_part) = match text.split_once('|') {
            Some((b, g)) => (b.trim(), Some(g.trim())),
            None => (text.trim(), None),
        };

        let global_rounds = match gr_part {
            Some(g) => parse_gr_attribute(g)?,
            None => default_global_rounds,
        };

        if body.is_empty() {
            return Err(ArgumentError::UnparsableSequence("empty sequence body".into()));
        }

        let mut steps = Vec::new();
        for token in body.split("->") {
            steps.push(parse_step_token(token.trim())?);
        }

        Sequence::new(steps, global_rounds)
    }
}

/// Which optional attributes [`Sequence::serialize`] should emit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeOptions {
    /// Emit `(ID:n)` after each transform name.
    pub include_id: bool,
    /// Emit `(TR:n)` after each transform name.
    pub include_rounds: bool,
    /// Emit the trailing `| (GR:n)` attribute.
    pub include_right_side_attributes: bool,
}

impl SerializeOptions {
    /// All attributes enabled — the canonical round-trippable form.
    #[must_use]
    pub const fn full() -> Self {
        Self { include_id: true, include_rounds: true, include_right_side_attributes: true }
    }
}

fn parse_gr_attribute(s: &str) -> Result<u32, ArgumentError> {
    let inner = s
        .trim()
        .strip_prefix("(GR:")
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| ArgumentError::UnparsableSequence(format!("bad GR attribute: {s}")))?;
    inner
        .parse::<u32>()
        .map_err(|e| ArgumentError::UnparsableSequence(format!("bad GR value: {e}")))
}

fn parse_step_token(token: &str) -> Result<(u8, u32), ArgumentError> {
    if token.is_empty() {
        return Err(ArgumentError::UnparsableSequence("empty step token".into()));
    }
    let paren_start = token.find('(');
    let name = match paren_start {
        Some(idx) => token[..idx].trim(),
        None => token.trim(),
    };
    if name.is_empty() {
        return Err(ArgumentError::UnparsableSequence(format!("missing name in step: {token}")));
    }

    let mut id: Option<u8> = None;
    let mut rounds: u32 = 1;

    if let Some(idx) = paren_start {
        for attr in token[idx..].split(')') {
            let attr = attr.trim_start_matches('(').trim();
            if attr.is_empty() {
                continue;
            }
            if let Some(v) = attr.strip_prefix("ID:") {
                id = Some(v.parse::<u8>().map_err(|e| {
                    ArgumentError::UnparsableSequence(format!("bad ID value: {e}"))
                })?);
            } else if let Some(v) = attr.strip_prefix("TR:") {
                rounds = v
                    .parse::<u32>()
                    .map_err(|e| ArgumentError::UnparsableSequence(format!("bad TR value: {e}")))?;
            } else {
                return Err(ArgumentError::UnparsableSequence(format!("unknown attribute: {attr}")));
            }
        }
    }

    let id = match id {
        Some(id) => id,
        None => catalog::id_for_name(name).ok_or_else(|| {
            ArgumentError::UnparsableSequence(format!("name '{name}' does not resolve uniquely"))
        })?,
    };

    Ok((id, rounds))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn round_trip_full_options() {
        let registry = TransformRegistry::bootstrap();
        let seq = Sequence::new(vec![(1, 2), (4, 3), (7, 1)], 5).unwrap();
        let text = seq.serialize(SerializeOptions::full(), &registry);
        let parsed = Sequence::parse(&text, 1).unwrap();
        assert_eq!(seq, parsed);
    }

    #[test]
    fn parse_defaults_tr_and_gr() {
        let seq = Sequence::parse("XorConstant(ID:1) -> ReverseBuffer(ID:7)", 4).unwrap();
        assert_eq!(seq.global_rounds, 4);
        assert_eq!(seq.steps[0].rounds, 1);
        assert_eq!(seq.steps[1].rounds, 1);
    }

    #[test]
    fn parse_resolves_name_without_id() {
        let seq = Sequence::parse("XorConstant -> ReverseBuffer | (GR:2)", 1).unwrap();
        assert_eq!(seq.steps[0].transform_id, 1);
        assert_eq!(seq.steps[1].transform_id, 7);
        assert_eq!(seq.global_rounds, 2);
    }

    #[test]
    fn empty_sequence_rejected() {
        assert_eq!(Sequence::new(vec![], 1), Err(ArgumentError::EmptySequence));
    }

    #[test]
    fn rounds_out_of_range_rejected() {
        assert_eq!(
            Sequence::new(vec![(1, 10)], 1),
            Err(ArgumentError::RoundsOutOfRange(10))
        );
    }
}
