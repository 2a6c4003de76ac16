//! Avalanche / Key-Dependency Harness (component E).
//!
//! Produces the two companion ciphertexts the cryptanalysis engine needs
//! beyond the candidate's own output: one from a single-bit-flipped
//! plaintext, one from a single-bit-flipped key, both derived
//! deterministically so repeated runs over the same candidate agree.

use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::sequence::Sequence;

/// Domain-separation context for the avalanche seed hash, kept distinct
/// from the pipeline's own key-derivation context (`core::pipeline`).
const AVALANCHE_SEED_CONTEXT: &[u8] = b"mungelab-avalanche-seed";

/// The three ciphertexts the cryptanalysis engine consumes for one candidate:
/// the candidate's own output, plus its two single-bit-flipped companions.
pub struct AvalancheSample {
    /// Ciphertext of the unmodified plaintext under the unmodified key.
    pub baseline: Vec<u8>,
    /// Ciphertext of the plaintext with its seed-selected bit flipped.
    pub plaintext_flipped: Vec<u8>,
    /// Ciphertext of the unmodified plaintext under a key with its
    /// seed-selected bit flipped.
    pub key_flipped: Vec<u8>,
}

/// Derive the 64-bit avalanche seed from a deterministic, domain-separated
/// keyed hash of the reversed sequence (`spec.md` §4.E step 1).
fn avalanche_seed(sequence: &Sequence) -> u64 {
    let context_key: [u8; 32] = blake3::hash(AVALANCHE_SEED_CONTEXT).into();
    let mut hasher = blake3::Hasher::new_keyed(&context_key);
    for step in sequence.steps.iter().rev() {
        hasher.update(&step.transform_id.to_le_bytes());
        hasher.update(&step.rounds.to_le_bytes());
    }
    hasher.update(&sequence.global_rounds.to_le_bytes());
    let hash = hasher.finalize();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Flip the bit at `seed mod (8*buf.len())` of `buf`, returning a new
/// buffer (`spec.md` §4.E step 2). Degenerate on empty input: returns an
/// empty clone unchanged.
fn flip_seeded_bit(buf: &[u8], seed: u64) -> Vec<u8> {
    let mut out = buf.to_vec();
    let total_bits = 8 * out.len() as u64;
    if total_bits == 0 {
        return out;
    }
    let position = (seed % total_bits) as usize;
    out[position / 8] ^= 1 << (position % 8);
    out
}

/// Run the baseline encryption plus its two single-bit-flip companions
/// under one [`Pipeline`], `sequence`, `password`, and `salt`. The flipped
/// bit position is derived independently for the plaintext and the
/// password from the same sequence-derived seed, so it tracks the
/// candidate rather than a fixed byte.
///
/// # Errors
/// Propagates any [`PipelineError`] from the three encrypt calls.
pub fn sample(
    pipeline: &Pipeline<'_>,
    sequence: &Sequence,
    password: &[u8],
    salt: [u8; 8],
    plaintext: &[u8],
) -> Result<AvalancheSample, PipelineError> {
    let seed = avalanche_seed(sequence);
    let baseline = pipeline.encrypt(sequence, password, salt, plaintext)?;

    let flipped_plaintext = flip_seeded_bit(plaintext, seed);
    let plaintext_flipped = pipeline.encrypt(sequence, password, salt, &flipped_plaintext)?;

    let flipped_password = flip_seeded_bit(password, seed);
    let key_flipped = pipeline.encrypt(sequence, &flipped_password, salt, plaintext)?;

    Ok(AvalancheSample { baseline, plaintext_flipped, key_flipped })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::registry::TransformRegistry;

    #[test]
    fn flipping_plaintext_bit_changes_ciphertext() {
        let registry = TransformRegistry::bootstrap();
        let pipeline = Pipeline::new(&registry);
        let sequence = Sequence::new(vec![(11, 1), (15, 2), (4, 1)], 3).unwrap();
        let plaintext = b"deterministic avalanche sample text, long enough to matter";
        let result = sample(&pipeline, &sequence, b"pw", [3u8; 8], plaintext).unwrap();
        assert_ne!(result.baseline, result.plaintext_flipped);
        assert_ne!(result.baseline, result.key_flipped);
    }

    #[test]
    fn same_inputs_are_deterministic() {
        let registry = TransformRegistry::bootstrap();
        let pipeline = Pipeline::new(&registry);
        let sequence = Sequence::new(vec![(1, 1)], 1).unwrap();
        let plaintext = b"repeat me please for determinism check";
        let a = sample(&pipeline, &sequence, b"pw", [1u8; 8], plaintext).unwrap();
        let b = sample(&pipeline, &sequence, b"pw", [1u8; 8], plaintext).unwrap();
        assert_eq!(a.baseline, b.baseline);
        assert_eq!(a.plaintext_flipped, b.plaintext_flipped);
        assert_eq!(a.key_flipped, b.key_flipped);
    }

    #[test]
    fn seed_tracks_the_sequence() {
        let a = Sequence::new(vec![(1, 1)], 1).unwrap();
        let b = Sequence::new(vec![(2, 1)], 1).unwrap();
        let c = Sequence::new(vec![(1, 1)], 1).unwrap();
        assert_ne!(avalanche_seed(&a), avalanche_seed(&b), "different sequences must seed differently");
        assert_eq!(avalanche_seed(&a), avalanche_seed(&c), "identical sequences must seed identically");
    }

    #[test]
    fn flip_seeded_bit_is_a_single_bit_difference() {
        let plaintext = b"exactly one bit of this buffer should ever differ after the flip";
        let seed = 12_345_678_u64;
        let flipped = flip_seeded_bit(plaintext, seed);
        let differing_bits: u32 = plaintext
            .iter()
            .zip(flipped.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum();
        assert_eq!(differing_bits, 1);
    }

    #[test]
    fn flip_seeded_bit_flips_the_position_the_seed_selects() {
        let plaintext = b"position math should match seed modulo total bit count exactly";
        let seed = 999_u64;
        let total_bits = 8 * plaintext.len() as u64;
        let position = (seed % total_bits) as usize;
        let flipped = flip_seeded_bit(plaintext, seed);
        assert_eq!(plaintext[position / 8] ^ flipped[position / 8], 1 << (position % 8));
    }

    #[test]
    fn flip_seeded_bit_on_empty_buffer_is_a_noop() {
        assert_eq!(flip_seeded_bit(&[], 42), Vec::<u8>::new());
    }
}
