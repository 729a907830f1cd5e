//! AES-CTR Keystream
//!
//! GCM's counter mode: the upper 96 bits of the counter block stay fixed and
//! the low 32 bits are a big-endian block counter that wraps mod 2^32.

use crate::kernels::constants::{BLOCK_SIZE, KEYSTREAM_BATCH};
use crate::kernels::Kernel;
use crate::types::{Block, SetupError};
use zeroize::Zeroize;

/// Most blocks one invocation may produce before the 32-bit counter repeats.
const MAX_BLOCKS: u64 = 1 << 32;

// =============================================================================
// COUNTER BLOCK
// =============================================================================

/// 128-bit counter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter(Block);

impl Counter {
    /// Wrap a raw counter block.
    #[must_use]
    pub const fn new(block: Block) -> Self {
        Self(block)
    }

    /// Low 32 bits, big-endian.
    #[must_use]
    pub const fn block_index(&self) -> u32 {
        u32::from_be_bytes([self.0[12], self.0[13], self.0[14], self.0[15]])
    }

    /// Add `n` to the low 32 bits, wrapping; the prefix is untouched.
    pub fn advance(&mut self, n: u32) {
        let next = self.block_index().wrapping_add(n);
        self.0[12..].copy_from_slice(&next.to_be_bytes());
    }

    /// `inc32` of this counter.
    #[must_use]
    pub fn incremented(mut self) -> Self {
        self.advance(1);
        self
    }

    /// Raw counter block.
    #[must_use]
    pub const fn to_block(self) -> Block {
        self.0
    }
}

impl Zeroize for Counter {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

// =============================================================================
// KEYSTREAM
// =============================================================================

/// Keystream generator positioned at a counter value.
pub struct CounterKeystream<'a, K: Kernel> {
    kernel: K,
    round_keys: &'a [Block],
    counter: Counter,
}

impl<'a, K: Kernel> CounterKeystream<'a, K> {
    /// Next block produced will be `E(K, counter)`.
    pub const fn new(kernel: K, round_keys: &'a [Block], counter: Counter) -> Self {
        Self {
            kernel,
            round_keys,
            counter,
        }
    }

    /// Counter value of the next keystream block.
    pub const fn counter(&self) -> Counter {
        self.counter
    }

    /// Fill `out` with keystream blocks and advance the counter.
    ///
    /// # Errors
    /// `SetupError::MessageTooLong` for more than 2^32 blocks.
    pub fn generate(&mut self, out: &mut [Block]) -> Result<(), SetupError> {
        if out.len() as u64 > MAX_BLOCKS {
            return Err(SetupError::MessageTooLong);
        }
        self.fill(out);
        Ok(())
    }

    /// XOR keystream into `data`. A trailing partial block consumes a whole
    /// counter value.
    pub fn apply(&mut self, data: &mut [u8]) {
        let mut scratch = [[0u8; BLOCK_SIZE]; KEYSTREAM_BATCH];
        for chunk in data.chunks_mut(KEYSTREAM_BATCH * BLOCK_SIZE) {
            let blocks = chunk.len().div_ceil(BLOCK_SIZE);
            self.fill(&mut scratch[..blocks]);
            for (byte, key) in chunk.iter_mut().zip(scratch.iter().flatten()) {
                *byte ^= key;
            }
        }
        scratch.zeroize();
    }

    fn fill(&mut self, out: &mut [Block]) {
        for block in out.iter_mut() {
            *block = self.counter.to_block();
            self.counter.advance(1);
        }
        self.kernel.encrypt_blocks(self.round_keys, out);
    }
}
