//! Portable software implementation of AES round and CLMUL primitives.
//!
//! Both follow the x86 instruction semantics (`AESENC`, `AESENCLAST`,
//! `PCLMULQDQ`) so the portable and AES-NI backends agree byte for byte.

use crate::kernels::constants::{GF_POLY, SBOX};
use crate::types::Block;

/// GF(2^8) multiplication by 2 (used in `MixColumns`).
/// Branchless: `b >> 7` extracts the MSB as 0 or 1; multiplying by `GF_POLY`
/// produces the conditional reduction polynomial without a data-dependent branch.
pub const fn gf_double(b: u8) -> u8 {
    (b << 1) ^ ((b >> 7) * GF_POLY)
}

/// AES `MixColumns` on a single 4-byte column.
fn mix_column(c: &mut [u8]) {
    let t = [c[0], c[1], c[2], c[3]];
    c[0] = gf_double(t[0] ^ t[1]) ^ t[1] ^ t[2] ^ t[3];
    c[1] = gf_double(t[1] ^ t[2]) ^ t[2] ^ t[3] ^ t[0];
    c[2] = gf_double(t[2] ^ t[3]) ^ t[3] ^ t[0] ^ t[1];
    c[3] = gf_double(t[3] ^ t[0]) ^ t[0] ^ t[1] ^ t[2];
}

/// `SubBytes` followed by `ShiftRows` (column-major state, FIPS-197 layout).
fn sub_shift(s: &mut Block) {
    for b in s.iter_mut() {
        *b = SBOX[*b as usize];
    }

    // Row 1: Shift left 1
    let tmp = s[1];
    s[1] = s[5];
    s[5] = s[9];
    s[9] = s[13];
    s[13] = tmp;
    // Row 2: Shift left 2
    s.swap(2, 10);
    s.swap(6, 14);
    // Row 3: Shift left 3
    let tmp = s[15];
    s[15] = s[11];
    s[11] = s[7];
    s[7] = s[3];
    s[3] = tmp;
}

fn add_round_key(s: &mut Block, key: &Block) {
    for (b, k) in s.iter_mut().zip(key) {
        *b ^= k;
    }
}

/// One full AES round: `SubBytes`, `ShiftRows`, `MixColumns`, `AddRoundKey`.
pub fn aesenc(state: &mut Block, key: &Block) {
    sub_shift(state);
    for column in state.chunks_exact_mut(4) {
        mix_column(column);
    }
    add_round_key(state, key);
}

/// Final AES round (no `MixColumns`).
pub fn aesenclast(state: &mut Block, key: &Block) {
    sub_shift(state);
    add_round_key(state, key);
}

/// Encrypt one block under an expanded key (`round_keys.len()` = rounds + 1).
pub fn encrypt_block(round_keys: &[Block], block: &mut Block) {
    let Some((last, middle)) = round_keys.split_last() else {
        return;
    };
    let Some((first, middle)) = middle.split_first() else {
        return;
    };

    add_round_key(block, first);
    for key in middle {
        aesenc(block, key);
    }
    aesenclast(block, last);
}

/// Carryless multiplication of two 64-bit integers (widening to 128-bit).
///
/// Implemented branchless: a data-dependent branch on individual bits of `b`
/// could leak timing information. Instead, each bit of `b` is converted to an
/// all-ones/all-zeros mask via `wrapping_neg`, and XOR is always performed.
pub fn clmul_u64(a: u64, b: u64) -> u128 {
    let a = u128::from(a);
    let mut res = 0u128;

    for i in 0..64 {
        let mask = u128::from((b >> i) & 1).wrapping_neg();
        res ^= (a << i) & mask;
    }
    res
}
