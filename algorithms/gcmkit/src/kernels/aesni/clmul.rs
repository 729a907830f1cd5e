//! PCLMULQDQ carry-less multiply.

#![allow(clippy::cast_possible_wrap)]

use core::arch::x86_64::{_mm_clmulepi64_si128, _mm_set_epi64x, _mm_storeu_si128};

/// 64x64 -> 128-bit carry-less product, same bit order as the portable kernel.
// SAFETY: Requires PCLMULQDQ/SSE2 CPU features (enforced by the `AesNi` token).
#[target_feature(enable = "pclmulqdq")]
#[target_feature(enable = "sse2")]
#[allow(unsafe_code)]
pub unsafe fn clmul_u64(a: u64, b: u64) -> u128 {
    let x = _mm_set_epi64x(0, a as i64);
    let y = _mm_set_epi64x(0, b as i64);
    let product = _mm_clmulepi64_si128(x, y, 0x00);

    let mut out = [0u8; 16];
    _mm_storeu_si128(out.as_mut_ptr().cast(), product);
    u128::from_le_bytes(out)
}
