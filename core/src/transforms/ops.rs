//! Concrete forward/inverse implementations for the built-in transform catalog.
//!
//! Each pair is proven reversible by `tests/reversibility.rs`'s exhaustive
//! sweep; the comments here note only the non-obvious invertibility argument
//! per transform, not what the code visibly does.

use super::KeyMaterial;

// =============================================================================
// SMALL SHARED HELPERS
// =============================================================================

/// Deterministic, non-cryptographic PRNG (SplitMix64) used only to build the
/// keyed S-box permutation below. Not used anywhere security-relevant.
struct SplitMix64(u64);

impl SplitMix64 {
    const fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

/// Build a 256-entry keyed permutation via Fisher-Yates over `SplitMix64`.
fn keyed_sbox(key: &KeyMaterial) -> [u8; 256] {
    let mut table: [u8; 256] = {
        let mut t = [0u8; 256];
        let mut i = 0usize;
        while i < 256 {
            t[i] = i as u8;
            i += 1;
        }
        t
    };
    let mut rng = SplitMix64::new(key.u64_at(0) ^ key.u64_at(8));
    for i in (1..256).rev() {
        let j = (rng.next_u64() as usize) % (i + 1);
        table.swap(i, j);
    }
    table
}

fn invert_permutation(table: &[u8; 256]) -> [u8; 256] {
    let mut inv = [0u8; 256];
    for (i, &v) in table.iter().enumerate() {
        inv[v as usize] = i as u8;
    }
    inv
}

/// Multiplicative inverse of an odd `a` modulo 256 (the group of units mod
/// `2^n` is exactly the odd residues, so this always succeeds for odd `a`).
fn mod_inverse_256(a: u8) -> u8 {
    let a = a as i32;
    let mut x: i32 = 1;
    // Newton's method for inverses mod 2^k, doubling precision each step.
    for _ in 0..8 {
        x = x.wrapping_mul(2i32.wrapping_sub(a.wrapping_mul(x)));
    }
    (x & 0xFF) as u8
}

fn rotate_left_bits(data: &mut [u8], bits: usize) {
    let len_bits = data.len() * 8;
    if len_bits == 0 {
        return;
    }
    let shift = bits % len_bits;
    if shift == 0 {
        return;
    }
    let original = data.to_vec();
    for (i, out) in data.iter_mut().enumerate() {
        let mut byte = 0u8;
        for bit in 0..8 {
            let dst_bit_index = i * 8 + bit;
            let src_bit_index = (dst_bit_index + shift) % len_bits;
            let src_byte = src_bit_index / 8;
            let src_bit = 7 - (src_bit_index % 8);
            let bit_val = (original[src_byte] >> src_bit) & 1;
            byte |= bit_val << (7 - bit);
        }
        *out = byte;
    }
}

fn rotate_right_bits(data: &mut [u8], bits: usize) {
    let len_bits = data.len() * 8;
    if len_bits == 0 {
        return;
    }
    rotate_left_bits(data, len_bits - (bits % len_bits));
}

// =============================================================================
// 1. XOR CONSTANT (involution)
// =============================================================================

pub fn xor_constant(data: &mut [u8], key: &KeyMaterial) {
    let c = key.byte_at(0);
    for b in data {
        *b ^= c;
    }
}

// =============================================================================
// 2/3. ADD / SUB CONSTANT
// =============================================================================

pub fn add_constant(data: &mut [u8], key: &KeyMaterial) {
    let c = key.byte_at(1);
    for b in data {
        *b = b.wrapping_add(c);
    }
}

pub fn sub_constant(data: &mut [u8], key: &KeyMaterial) {
    let c = key.byte_at(1);
    for b in data {
        *b = b.wrapping_sub(c);
    }
}

// =============================================================================
// 4/5. ROTATE LEFT/RIGHT 8 (per-byte bit rotation)
// =============================================================================

pub fn rotate_left8(data: &mut [u8], key: &KeyMaterial) {
    let k = key.byte_at(2) % 8;
    for b in data {
        *b = b.rotate_left(u32::from(k));
    }
}

pub fn rotate_right8(data: &mut [u8], key: &KeyMaterial) {
    let k = key.byte_at(2) % 8;
    for b in data {
        *b = b.rotate_right(u32::from(k));
    }
}

// =============================================================================
// 6. BYTE SWAP PAIRS (involution)
// =============================================================================

pub fn byte_swap_pairs(data: &mut [u8], _key: &KeyMaterial) {
    let pairs = data.len() / 2;
    for i in 0..pairs {
        data.swap(i * 2, i * 2 + 1);
    }
}

// =============================================================================
// 7. REVERSE BUFFER (involution)
// =============================================================================

pub fn reverse_buffer(data: &mut [u8], _key: &KeyMaterial) {
    data.reverse();
}

// =============================================================================
// 8. NIBBLE SWAP (involution)
// =============================================================================

pub fn nibble_swap(data: &mut [u8], _key: &KeyMaterial) {
    for b in data {
        *b = (*b << 4) | (*b >> 4);
    }
}

// =============================================================================
// 9/10. BIT ROTATE STREAM
// =============================================================================

pub fn bit_rotate_stream(data: &mut [u8], key: &KeyMaterial) {
    let bits = key.u32_at(3) as usize;
    rotate_left_bits(data, bits);
}

pub fn bit_rotate_stream_inverse(data: &mut [u8], key: &KeyMaterial) {
    let bits = key.u32_at(3) as usize;
    rotate_right_bits(data, bits);
}

// =============================================================================
// 11/12. S-BOX FORWARD / INVERSE
// =============================================================================

pub fn sbox_forward(data: &mut [u8], key: &KeyMaterial) {
    let table = keyed_sbox(key);
    for b in data {
        *b = table[*b as usize];
    }
}

pub fn sbox_inverse(data: &mut [u8], key: &KeyMaterial) {
    let table = invert_permutation(&keyed_sbox(key));
    for b in data {
        *b = table[*b as usize];
    }
}

// =============================================================================
// 13/14. BLOCK TRANSPOSE 4 (cyclic rotation within 4-byte blocks)
// =============================================================================

pub fn block_transpose4(data: &mut [u8], _key: &KeyMaterial) {
    let blocks = data.len() / 4;
    for i in 0..blocks {
        let base = i * 4;
        data[base..base + 4].rotate_left(1);
    }
}

pub fn block_transpose4_inverse(data: &mut [u8], _key: &KeyMaterial) {
    let blocks = data.len() / 4;
    for i in 0..blocks {
        let base = i * 4;
        data[base..base + 4].rotate_right(1);
    }
}

// =============================================================================
// 15/16. CASCADE XOR CHAIN (CFB-style feedback, keyed IV)
// =============================================================================

pub fn cascade_xor_chain(data: &mut [u8], key: &KeyMaterial) {
    let mut prev = key.byte_at(4);
    for b in data.iter_mut() {
        let c = *b ^ prev;
        *b = c;
        prev = c;
    }
}

pub fn cascade_xor_chain_inverse(data: &mut [u8], key: &KeyMaterial) {
    let mut prev = key.byte_at(4);
    for b in data.iter_mut() {
        let c = *b;
        *b = c ^ prev;
        prev = c;
    }
}

// =============================================================================
// 17/18. DELTA ENCODE / DECODE
// =============================================================================

pub fn delta_encode(data: &mut [u8], _key: &KeyMaterial) {
    for i in (1..data.len()).rev() {
        data[i] = data[i].wrapping_sub(data[i - 1]);
    }
}

pub fn delta_decode(data: &mut [u8], _key: &KeyMaterial) {
    for i in 1..data.len() {
        data[i] = data[i].wrapping_add(data[i - 1]);
    }
}

// =============================================================================
// 19/20. INTERLEAVE SPLIT / MERGE (perfect-shuffle permutation)
// =============================================================================

pub fn interleave_split(data: &mut [u8], _key: &KeyMaterial) {
    let original = data.to_vec();
    let mut idx = 0;
    for i in (0..original.len()).step_by(2) {
        data[idx] = original[i];
        idx += 1;
    }
    for i in (1..original.len()).step_by(2) {
        data[idx] = original[i];
        idx += 1;
    }
}

pub fn interleave_merge(data: &mut [u8], _key: &KeyMaterial) {
    let original = data.to_vec();
    let even_count = original.len().div_ceil(2);
    let mut idx = 0;
    for i in 0..even_count {
        data[idx] = original[i];
        idx += 2;
    }
    let mut idx = 1;
    for i in even_count..original.len() {
        data[idx] = original[i];
        idx += 2;
    }
}

// =============================================================================
// 21/22. AFFINE BYTE (y = a*x + b mod 256, a odd)
// =============================================================================

pub fn affine_byte(data: &mut [u8], key: &KeyMaterial) {
    let a = key.byte_at(5) | 1; // force odd -> invertible mod 256
    let b = key.byte_at(6);
    for byte in data {
        *byte = byte.wrapping_mul(a).wrapping_add(b);
    }
}

pub fn affine_byte_inverse(data: &mut [u8], key: &KeyMaterial) {
    let a = key.byte_at(5) | 1;
    let b = key.byte_at(6);
    let a_inv = mod_inverse_256(a);
    for byte in data {
        *byte = byte.wrapping_sub(b).wrapping_mul(a_inv);
    }
}

// =============================================================================
// 23/24. RUN-LENGTH FOLD / UNFOLD (prefix-XOR scan)
// =============================================================================

pub fn run_length_fold(data: &mut [u8], _key: &KeyMaterial) {
    for i in 1..data.len() {
        data[i] ^= data[i - 1];
    }
}

pub fn run_length_unfold(data: &mut [u8], _key: &KeyMaterial) {
    for i in (1..data.len()).rev() {
        data[i] ^= data[i - 1];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn km() -> KeyMaterial {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8 * 7 + 3;
        }
        KeyMaterial::new(bytes)
    }

    #[test]
    fn mod_inverse_is_correct_for_all_odd_residues() {
        for a in (1..=255u16).step_by(2) {
            let a = a as u8;
            let inv = mod_inverse_256(a);
            assert_eq!(a.wrapping_mul(inv), 1, "a={a} inv={inv}");
        }
    }

    #[test]
    fn sbox_is_a_permutation() {
        let table = keyed_sbox(&km());
        let mut seen = [false; 256];
        for &v in &table {
            assert!(!seen[v as usize]);
            seen[v as usize] = true;
        }
    }

    #[test]
    fn run_length_fold_round_trips() {
        let mut data = vec![5u8, 3, 9, 2, 250, 0, 17];
        let original = data.clone();
        run_length_fold(&mut data, &km());
        run_length_unfold(&mut data, &km());
        assert_eq!(data, original);
    }

    #[test]
    fn bit_rotate_round_trips() {
        let key = km();
        let original = vec![0x12, 0x34, 0x56, 0x78, 0x9A];
        let mut data = original.clone();
        bit_rotate_stream(&mut data, &key);
        bit_rotate_stream_inverse(&mut data, &key);
        assert_eq!(data, original);
    }
}
