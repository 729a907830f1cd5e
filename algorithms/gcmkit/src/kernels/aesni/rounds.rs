//! AES-NI Block Encryption
//!
//! Encrypts independent blocks (counter blocks, the zero block for H) four at
//! a time so the `AESENC` latency of one block hides behind the others.

use crate::kernels::constants::MAX_ROUND_KEYS;
use crate::types::Block;

use core::arch::x86_64::{
    __m128i, _mm_aesenc_si128, _mm_aesenclast_si128, _mm_loadu_si128, _mm_setzero_si128,
    _mm_storeu_si128, _mm_xor_si128,
};

/// Blocks kept in flight per round.
const LANES: usize = 4;

// =============================================================================
// ENCRYPTION
// =============================================================================

/// Encrypt every block in place.
// SAFETY: Requires AES/SSE2 CPU features (enforced by the `AesNi` token).
// Loads and stores go through `&[u8; 16]` references, so unaligned access is
// the only assumption and `loadu`/`storeu` permit it.
#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
#[allow(unsafe_code)]
pub unsafe fn encrypt_blocks(round_keys: &[Block], blocks: &mut [Block]) {
    let count = round_keys.len().min(MAX_ROUND_KEYS);
    if count < 2 {
        return;
    }

    let mut schedule = [_mm_setzero_si128(); MAX_ROUND_KEYS];
    for (slot, key) in schedule.iter_mut().zip(round_keys) {
        *slot = _mm_loadu_si128(key.as_ptr().cast());
    }
    let first = schedule[0];
    let last = schedule[count - 1];
    let middle = &schedule[1..count - 1];

    let mut chunks = blocks.chunks_exact_mut(LANES);
    for chunk in &mut chunks {
        let mut s: [__m128i; LANES] = [_mm_setzero_si128(); LANES];
        for (lane, block) in s.iter_mut().zip(chunk.iter()) {
            *lane = _mm_xor_si128(_mm_loadu_si128(block.as_ptr().cast()), first);
        }
        for &rk in middle {
            s[0] = _mm_aesenc_si128(s[0], rk);
            s[1] = _mm_aesenc_si128(s[1], rk);
            s[2] = _mm_aesenc_si128(s[2], rk);
            s[3] = _mm_aesenc_si128(s[3], rk);
        }
        for (lane, block) in s.iter().zip(chunk.iter_mut()) {
            _mm_storeu_si128(block.as_mut_ptr().cast(), _mm_aesenclast_si128(*lane, last));
        }
    }

    for block in chunks.into_remainder() {
        let mut s = _mm_xor_si128(_mm_loadu_si128(block.as_ptr().cast()), first);
        for &rk in middle {
            s = _mm_aesenc_si128(s, rk);
        }
        _mm_storeu_si128(block.as_mut_ptr().cast(), _mm_aesenclast_si128(s, last));
    }
}
