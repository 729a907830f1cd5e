//! AES-NI Kernel Module
//!
//! `AESENC`/`AESENCLAST` with four blocks in flight and `PCLMULQDQ` for the
//! GHASH partial products.

#![allow(unsafe_code)]

// =============================================================================
// MODULES
// =============================================================================

mod clmul;
mod rounds;

use super::Kernel;
use crate::types::{Backend, Block};

// =============================================================================
// KERNEL TOKEN
// =============================================================================

/// AES-NI + PCLMULQDQ kernel.
///
/// Only obtainable through [`AesNi::detect`], so every value is proof that
/// the running CPU supports the instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AesNi {
    _detected: (),
}

impl AesNi {
    /// Runtime detection (std) of AES, PCLMULQDQ and SSE2.
    #[cfg(feature = "std")]
    #[must_use]
    pub fn detect() -> Option<Self> {
        let supported = is_x86_feature_detected!("aes")
            && is_x86_feature_detected!("pclmulqdq")
            && is_x86_feature_detected!("sse2");
        supported.then_some(Self { _detected: () })
    }

    /// Compile-time detection (no_std).
    #[cfg(not(feature = "std"))]
    #[must_use]
    pub const fn detect() -> Option<Self> {
        if cfg!(all(
            target_feature = "aes",
            target_feature = "pclmulqdq",
            target_feature = "sse2"
        )) {
            Some(Self { _detected: () })
        } else {
            None
        }
    }
}

impl Kernel for AesNi {
    fn backend(self) -> Backend {
        Backend::AesNi
    }

    fn encrypt_blocks(self, round_keys: &[Block], blocks: &mut [Block]) {
        // SAFETY: `self` exists only after AES/SSE2 detection succeeded.
        unsafe { rounds::encrypt_blocks(round_keys, blocks) }
    }

    fn clmul(self, a: u64, b: u64) -> u128 {
        // SAFETY: `self` exists only after PCLMULQDQ/SSE2 detection succeeded.
        unsafe { clmul::clmul_u64(a, b) }
    }
}
