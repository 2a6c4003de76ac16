//! Transform function interface shared by every catalog entry.
//!
//! Every transform is a pair of function pointers operating in place on a
//! fixed-length byte buffer, mirroring the unified kernel-function-pointer
//! pattern used for hardware dispatch in the teacher codebase: one function
//! signature, many interchangeable implementations, selected by id rather
//! than by hardware feature.

pub mod catalog;
mod ops;

/// Per-call key material derived once by the pipeline's keyed derivation
/// step (`SPEC_FULL.md` §4.C) and threaded into every keyed transform
/// invocation within that Encrypt/Decrypt call.
#[derive(Debug, Clone, Copy)]
pub struct KeyMaterial {
    bytes: [u8; 32],
}

impl KeyMaterial {
    /// Wrap 32 bytes of derived key material.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Byte at `idx`, wrapping around the 32-byte block.
    #[must_use]
    pub fn byte_at(&self, idx: usize) -> u8 {
        self.bytes[idx % self.bytes.len()]
    }

    /// Little-endian `u32` built from four bytes starting at `idx`, wrapping.
    #[must_use]
    pub fn u32_at(&self, idx: usize) -> u32 {
        let mut out = [0u8; 4];
        for (i, b) in out.iter_mut().enumerate() {
            *b = self.byte_at(idx + i);
        }
        u32::from_le_bytes(out)
    }

    /// Little-endian `u64` built from eight bytes starting at `idx`, wrapping.
    #[must_use]
    pub fn u64_at(&self, idx: usize) -> u64 {
        let mut out = [0u8; 8];
        for (i, b) in out.iter_mut().enumerate() {
            *b = self.byte_at(idx + i);
        }
        u64::from_le_bytes(out)
    }
}

/// Unified transform function signature: mutate `data` in place using `key`.
pub type TransformFn = fn(data: &mut [u8], key: &KeyMaterial);
