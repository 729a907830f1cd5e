//! Portable implementation of the GCM kernel primitives.
//!
//! Pure Rust, no SIMD, no data-dependent branches. This is the reference
//! backend: every accelerated kernel must match it byte for byte.

use super::Kernel;
use crate::types::{Backend, Block};

mod utils;

pub use utils::{aesenc, aesenclast, clmul_u64};

/// Portable software kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Portable;

impl Kernel for Portable {
    fn backend(self) -> Backend {
        Backend::Portable
    }

    fn encrypt_blocks(self, round_keys: &[Block], blocks: &mut [Block]) {
        for block in blocks {
            utils::encrypt_block(round_keys, block);
        }
    }

    fn clmul(self, a: u64, b: u64) -> u128 {
        clmul_u64(a, b)
    }
}
