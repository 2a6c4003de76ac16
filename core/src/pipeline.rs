//! Transform Pipeline (component C).
//!
//! Applies an ordered [`Sequence`] under a global round count, producing a
//! small fixed header plus ciphertext on encrypt, and the mirrored inverse
//! on decrypt.

use crate::error::{ArgumentError, PipelineError};
use crate::registry::TransformRegistry;
use crate::sequence::Sequence;
use crate::transforms::{catalog, KeyMaterial};

/// Fixed wire-format header length, in bytes (§4.C supplement in `SPEC_FULL.md`).
pub const HEADER_LEN: usize = 16;

const MAGIC: [u8; 4] = *b"MNGE";
const VERSION: u8 = 1;

struct Header {
    global_rounds: u8,
    salt: [u8; 8],
}

impl Header {
    fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4] = VERSION;
        buf[5] = self.global_rounds;
        // buf[6..8] reserved, left zero
        buf[8..16].copy_from_slice(&self.salt);
        buf
    }

    fn decode(bytes: &[u8]) -> Result<Self, PipelineError> {
        if bytes.len() < HEADER_LEN {
            return Err(PipelineError::TruncatedCiphertext { expected: HEADER_LEN, got: bytes.len() });
        }
        if bytes[0..4] != MAGIC {
            return Err(PipelineError::BadMagic);
        }
        let global_rounds = bytes[5];
        let mut salt = [0u8; 8];
        salt.copy_from_slice(&bytes[8..16]);
        Ok(Self { global_rounds, salt })
    }
}

/// Derive the per-call [`KeyMaterial`] from a password and salt.
///
/// This is the pipeline's only cryptographic primitive dependency: a
/// `blake3` keyed hash, domain-separated from the avalanche harness's own
/// seed derivation (`SPEC_FULL.md` §4.E).
#[must_use]
pub fn derive_key_material(password: &[u8], salt: &[u8; 8]) -> KeyMaterial {
    let password_key: [u8; 32] = blake3::hash(password).into();
    let mut context = Vec::with_capacity(8 + salt.len());
    context.extend_from_slice(b"mungelab-pipeline-v1");
    context.extend_from_slice(salt);
    let derived = blake3::keyed_hash(&password_key, &context);
    KeyMaterial::new(*derived.as_bytes())
}

/// Applies [`Sequence`]s to byte buffers using a [`TransformRegistry`].
pub struct Pipeline<'a> {
    registry: &'a TransformRegistry,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline bound to `registry`.
    #[must_use]
    pub const fn new(registry: &'a TransformRegistry) -> Self {
        Self { registry }
    }

    /// Encrypt contract (§4.C): apply `sequence` forward, `sequence.global_rounds`
    /// times, and prepend the fixed header.
    ///
    /// # Errors
    /// Returns [`ArgumentError::EmptyInput`] if `plaintext` is empty, or a
    /// registry error if `sequence` references an unregistered id.
    pub fn encrypt(
        &self,
        sequence: &Sequence,
        password: &[u8],
        salt: [u8; 8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, PipelineError> {
        if plaintext.is_empty() {
            return Err(ArgumentError::EmptyInput.into());
        }
        let key = derive_key_material(password, &salt);
        let mut buffer = plaintext.to_vec();
        self.apply_forward(sequence, sequence.global_rounds, &key, &mut buffer)?;

        let header = Header { global_rounds: clamp_to_u8(sequence.global_rounds), salt };
        let mut out = Vec::with_capacity(HEADER_LEN + buffer.len());
        out.extend_from_slice(&header.encode());
        out.extend_from_slice(&buffer);
        Ok(out)
    }

    /// Decrypt contract (§4.C): strip the header, reverse `sequence` and
    /// swap each id for its registry inverse, then apply that inverse
    /// sequence the header's recorded number of global rounds.
    ///
    /// # Errors
    /// Returns [`PipelineError::TruncatedCiphertext`] if `ciphertext` is
    /// shorter than [`HEADER_LEN`], [`PipelineError::BadMagic`] if the
    /// header magic does not match, or a registry error if `sequence`
    /// references an unregistered id.
    pub fn decrypt(
        &self,
        sequence: &Sequence,
        password: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, PipelineError> {
        let header = Header::decode(ciphertext)?;
        let key = derive_key_material(password, &header.salt);
        let mut buffer = ciphertext[HEADER_LEN..].to_vec();
        let inverted = sequence.inverted(self.registry)?;
        self.apply_forward(&inverted, u32::from(header.global_rounds), &key, &mut buffer)?;
        Ok(buffer)
    }

    /// Strip the fixed header from a ciphertext, returning the raw payload
    /// for cryptanalysis use (§4.D inputs).
    ///
    /// # Errors
    /// Returns [`PipelineError::TruncatedCiphertext`] if `ciphertext` is
    /// shorter than [`HEADER_LEN`].
    pub fn payload_only<'c>(ciphertext: &'c [u8]) -> Result<&'c [u8], PipelineError> {
        if ciphertext.len() < HEADER_LEN {
            return Err(PipelineError::TruncatedCiphertext { expected: HEADER_LEN, got: ciphertext.len() });
        }
        Ok(&ciphertext[HEADER_LEN..])
    }

    /// Apply `sequence`'s steps, in order, `global_rounds` times, each step
    /// iterated its own `rounds` count per global round. Used identically
    /// for the forward (encrypt) and already-inverted (decrypt) direction.
    fn apply_forward(
        &self,
        sequence: &Sequence,
        global_rounds: u32,
        key: &KeyMaterial,
        buffer: &mut [u8],
    ) -> Result<(), PipelineError> {
        for _ in 0..global_rounds {
            for step in &sequence.steps {
                // Validates the id exists even if the registry's own inverse
                // bookkeeping is skipped (decrypt already resolved inverses).
                self.registry.get(step.transform_id)?;
                let apply = catalog::forward_fn(step.transform_id)
                    .ok_or(crate::error::RegistryError::UnknownTransform(step.transform_id))?;
                for _ in 0..step.rounds {
                    apply(buffer, key);
                }
            }
        }
        Ok(())
    }
}

fn clamp_to_u8(v: u32) -> u8 {
    u8::try_from(v).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn decrypt_inverts_encrypt() {
        let registry = TransformRegistry::bootstrap();
        let pipeline = Pipeline::new(&registry);
        let sequence = Sequence::new(vec![(1, 2), (4, 1), (15, 3)], 2).unwrap();
        let plaintext = b"the quick brown fox jumps over the lazy dog";
        let salt = [7u8; 8];
        let ciphertext = pipeline.encrypt(&sequence, b"hunter2", salt, plaintext).unwrap();
        let recovered = pipeline.decrypt(&sequence, b"hunter2", &ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn payload_only_strips_header() {
        let registry = TransformRegistry::bootstrap();
        let pipeline = Pipeline::new(&registry);
        let sequence = Sequence::new(vec![(7, 1)], 1).unwrap();
        let ciphertext = pipeline.encrypt(&sequence, b"pw", [0u8; 8], b"hello world").unwrap();
        let payload = Pipeline::payload_only(&ciphertext).unwrap();
        assert_eq!(payload.len(), ciphertext.len() - HEADER_LEN);
    }

    #[test]
    fn truncated_ciphertext_rejected() {
        let registry = TransformRegistry::bootstrap();
        let pipeline = Pipeline::new(&registry);
        let sequence = Sequence::new(vec![(7, 1)], 1).unwrap();
        let err = pipeline.decrypt(&sequence, b"pw", &[0u8; 4]).unwrap_err();
        assert!(matches!(err, PipelineError::TruncatedCiphertext { .. }));
    }

    #[test]
    fn empty_plaintext_rejected() {
        let registry = TransformRegistry::bootstrap();
        let pipeline = Pipeline::new(&registry);
        let sequence = Sequence::new(vec![(1, 1)], 1).unwrap();
        let err = pipeline.encrypt(&sequence, b"pw", [0u8; 8], b"").unwrap_err();
        assert!(matches!(err, PipelineError::Argument(ArgumentError::EmptyInput)));
    }
}
