//! Built-in transform catalog (24 reversible byte transforms, ids 1-24).
//!
//! See `SPEC_FULL.md` §4.A for the numbered list this mirrors.

use super::ops;
use super::TransformFn;
use crate::registry::{Transform, TransformCategory};

/// Look up the forward application function for a transform id.
#[must_use]
pub fn forward_fn(id: u8) -> Option<TransformFn> {
    Some(match id {
        1 => ops::xor_constant,
        2 => ops::add_constant,
        3 => ops::sub_constant,
        4 => ops::rotate_left8,
        5 => ops::rotate_right8,
        6 => ops::byte_swap_pairs,
        7 => ops::reverse_buffer,
        8 => ops::nibble_swap,
        9 => ops::bit_rotate_stream,
        10 => ops::bit_rotate_stream_inverse,
        11 => ops::sbox_forward,
        12 => ops::sbox_inverse,
        13 => ops::block_transpose4,
        14 => ops::block_transpose4_inverse,
        15 => ops::cascade_xor_chain,
        16 => ops::cascade_xor_chain_inverse,
        17 => ops::delta_encode,
        18 => ops::delta_decode,
        19 => ops::interleave_split,
        20 => ops::interleave_merge,
        21 => ops::affine_byte,
        22 => ops::affine_byte_inverse,
        23 => ops::run_length_fold,
        24 => ops::run_length_unfold,
        _ => return None,
    })
}

/// Build the full built-in transform descriptor list.
#[must_use]
pub fn built_in_transforms() -> Vec<Transform> {
    use TransformCategory::{Arithmetic, Bitwise, Feedback, Permutation, Substitution};

    let specs: &[(u8, &'static str, u8, TransformCategory)] = &[
        (1, "XorConstant", 1, Bitwise),
        (2, "AddConstant", 3, Arithmetic),
        (3, "SubConstant", 2, Arithmetic),
        (4, "RotateLeft8", 5, Bitwise),
        (5, "RotateRight8", 4, Bitwise),
        (6, "ByteSwapPairs", 6, Permutation),
        (7, "ReverseBuffer", 7, Permutation),
        (8, "NibbleSwap", 8, Bitwise),
        (9, "BitRotateStream", 10, Bitwise),
        (10, "BitRotateStreamInverse", 9, Bitwise),
        (11, "SBoxForward", 12, Substitution),
        (12, "SBoxInverse", 11, Substitution),
        (13, "BlockTranspose4", 14, Permutation),
        (14, "BlockTranspose4Inverse", 13, Permutation),
        (15, "CascadeXorChain", 16, Feedback),
        (16, "CascadeXorChainInverse", 15, Feedback),
        (17, "DeltaEncode", 18, Feedback),
        (18, "DeltaDecode", 17, Feedback),
        (19, "InterleaveSplit", 20, Permutation),
        (20, "InterleaveMerge", 19, Permutation),
        (21, "AffineByte", 22, Arithmetic),
        (22, "AffineByteInverse", 21, Arithmetic),
        (23, "RunLengthFold", 24, Feedback),
        (24, "RunLengthUnfold", 23, Feedback),
    ];

    specs
        .iter()
        .map(|&(id, name, inverse_id, category)| Transform {
            id,
            name,
            inverse_id,
            category,
            benchmark_time_ms: 0.0,
        })
        .collect()
}

/// Resolve a transform name to its id by exact, case-sensitive match
/// against the built-in catalog. Used by sequence parsing when the text
/// form omits the `(ID:n)` attribute.
#[must_use]
pub fn id_for_name(name: &str) -> Option<u8> {
    built_in_transforms()
        .into_iter()
        .find(|t| t.name == name)
        .map(|t| t.id)
}

/// Resolve a transform id to its catalog name.
#[must_use]
pub fn name_for_id(id: u8) -> Option<&'static str> {
    built_in_transforms().into_iter().find(|t| t.id == id).map(|t| t.name)
}
