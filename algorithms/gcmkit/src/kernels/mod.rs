//! Kernel Backends
//!
//! Hardware-specific implementations of the two primitives GCM is built on:
//! AES block encryption and 64x64 carry-less multiplication. Everything
//! above them (key schedule, GHASH, counter mode, AEAD) is written once,
//! generic over [`Kernel`].

#[cfg(target_arch = "x86_64")]
pub mod aesni;
pub mod constants;
pub mod portable;

use crate::types::{Backend, Block};

/// Primitive operations a backend must provide.
pub trait Kernel: Copy {
    /// Which backend this is.
    fn backend(self) -> Backend;

    /// Encrypt every block in place under an expanded key
    /// (`round_keys.len()` = rounds + 1).
    fn encrypt_blocks(self, round_keys: &[Block], blocks: &mut [Block]);

    /// Carry-less 64x64 -> 128-bit product.
    fn clmul(self, a: u64, b: u64) -> u128;

    /// Encrypt a single block in place.
    #[inline]
    fn encrypt_block(self, round_keys: &[Block], block: &mut Block) {
        self.encrypt_blocks(round_keys, core::slice::from_mut(block));
    }
}
