//! GHASH over GF(2^128)
//!
//! Blocks are loaded big-endian into a `u128`, which turns GCM's reflected
//! bit order into the POLYVAL convention. In that form the subkey is
//! "twisted" (multiplied by x once) and every multiplication is a Montgomery
//! product `a * b * x^-128`, computed as a three-multiply Karatsuba
//! decomposition followed by a two-fold reduction with the constant
//! `0xC2 << 56`. The result is bit-identical to the textbook GHASH of
//! NIST SP 800-38D.
//!
//! Several blocks are absorbed per reduction using precomputed powers of the
//! twisted subkey (Horner's rule):
//!
//! ```text
//! acc' = (acc ^ X0) * H^n  ^  X1 * H^(n-1)  ^  ...  ^  X(n-1) * H
//! ```

use crate::kernels::constants::{BLOCK_SIZE, GHASH_REDUCTION, GHASH_TWIST, MAX_HASH_BATCH};
use crate::kernels::Kernel;
use crate::types::Block;
use core::ops::{BitXor, BitXorAssign};
use zeroize::Zeroize;

// =============================================================================
// FIELD ELEMENT
// =============================================================================

/// Element of GF(2^128) in the byte-reversed (POLYVAL) representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldElement(pub u128);

impl FieldElement {
    /// Additive identity.
    pub const ZERO: Self = Self(0);

    /// Load a GCM block.
    #[must_use]
    pub const fn from_block(block: &Block) -> Self {
        Self(u128::from_be_bytes(*block))
    }

    /// Store back into GCM byte order.
    #[must_use]
    pub const fn to_block(self) -> Block {
        self.0.to_be_bytes()
    }

    /// GCM length block: `len(A)` in bits followed by `len(C)` in bits.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn from_lengths(aad_bits: u64, text_bits: u64) -> Self {
        Self(((aad_bits as u128) << 64) | text_bits as u128)
    }

    /// Multiply by x (mod the POLYVAL polynomial). Applied once to H so that
    /// Montgomery products of reflected blocks equal GHASH products.
    #[must_use]
    pub const fn twist(self) -> Self {
        let carry = (self.0 >> 127).wrapping_neg();
        Self((self.0 << 1) ^ (carry & GHASH_TWIST))
    }

    fn load(bytes: &[u8]) -> Self {
        let mut block = [0u8; BLOCK_SIZE];
        let n = bytes.len().min(BLOCK_SIZE);
        block[..n].copy_from_slice(&bytes[..n]);
        Self::from_block(&block)
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn lo(self) -> u64 {
        self.0 as u64
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn hi(self) -> u64 {
        (self.0 >> 64) as u64
    }
}

impl BitXor for FieldElement {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for FieldElement {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl Zeroize for FieldElement {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

// =============================================================================
// MULTIPLICATION
// =============================================================================

/// Unreduced Karatsuba partial products. Sums of these reduce to the sum of
/// the individual reductions, so a batch needs only one reduction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WideProduct {
    lo: u128,
    mid: u128,
    hi: u128,
}

impl BitXorAssign for WideProduct {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.lo ^= rhs.lo;
        self.mid ^= rhs.mid;
        self.hi ^= rhs.hi;
    }
}

/// 128x128 carry-less product as three 64x64 multiplies.
#[inline]
pub fn multiply_wide<K: Kernel>(kernel: K, a: FieldElement, b: FieldElement) -> WideProduct {
    WideProduct {
        lo: kernel.clmul(a.lo(), b.lo()),
        hi: kernel.clmul(a.hi(), b.hi()),
        mid: kernel.clmul(a.lo() ^ a.hi(), b.lo() ^ b.hi()),
    }
}

/// Reduce a 256-bit product to `product * x^-128`.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub fn reduce<K: Kernel>(kernel: K, wide: WideProduct) -> FieldElement {
    let mid = wide.mid ^ wide.lo ^ wide.hi;
    let low = wide.lo ^ (mid << 64);
    let high = wide.hi ^ (mid >> 64);

    let mut folded = low;
    for _ in 0..2 {
        let r0 = folded as u64;
        let r1 = (folded >> 64) as u64;
        folded = kernel.clmul(r0, GHASH_REDUCTION) ^ (u128::from(r0) << 64) ^ u128::from(r1);
    }
    FieldElement(high ^ folded)
}

/// Montgomery product `a * b * x^-128`.
#[inline]
pub fn multiply_reduce<K: Kernel>(kernel: K, a: FieldElement, b: FieldElement) -> FieldElement {
    reduce(kernel, multiply_wide(kernel, a, b))
}

/// GHASH subkey: the all-zero block encrypted under the round keys.
pub fn derive_h<K: Kernel>(kernel: K, round_keys: &[Block]) -> FieldElement {
    let mut block = [0u8; BLOCK_SIZE];
    kernel.encrypt_block(round_keys, &mut block);
    FieldElement::from_block(&block)
}

// =============================================================================
// POWERS OF H
// =============================================================================

/// Twisted powers `H, H^2, .., H^n` used for Horner batching.
#[derive(Clone)]
pub struct HashPowers {
    powers: [FieldElement; MAX_HASH_BATCH],
    count: usize,
}

impl HashPowers {
    /// Precompute `batch` powers of the raw subkey `h` (clamped to 1..=8).
    pub fn new<K: Kernel>(kernel: K, h: FieldElement, batch: usize) -> Self {
        let count = batch.clamp(1, MAX_HASH_BATCH);
        let mut powers = [FieldElement::ZERO; MAX_HASH_BATCH];
        let base = h.twist();
        powers[0] = base;
        for k in 1..count {
            powers[k] = multiply_reduce(kernel, powers[k - 1], base);
        }
        Self { powers, count }
    }

    /// `[H^1, .., H^n]` in twisted form.
    #[must_use]
    pub fn as_slice(&self) -> &[FieldElement] {
        &self.powers[..self.count]
    }

    /// Batch size.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        self.count
    }
}

impl Drop for HashPowers {
    fn drop(&mut self) {
        self.powers.zeroize();
    }
}

// =============================================================================
// HASHER
// =============================================================================

/// Running GHASH over one message.
pub struct GaloisHash<'a, K: Kernel> {
    kernel: K,
    powers: &'a HashPowers,
    acc: FieldElement,
}

impl<'a, K: Kernel> GaloisHash<'a, K> {
    /// Start from a zero accumulator.
    pub const fn new(kernel: K, powers: &'a HashPowers) -> Self {
        Self::with_accumulator(kernel, powers, FieldElement::ZERO)
    }

    /// Resume from a saved accumulator.
    pub const fn with_accumulator(kernel: K, powers: &'a HashPowers, acc: FieldElement) -> Self {
        Self {
            kernel,
            powers,
            acc,
        }
    }

    /// Absorb `data`; a trailing partial block is zero-padded.
    pub fn update(&mut self, data: &[u8]) {
        let stride = self.powers.len() * BLOCK_SIZE;
        let mut batches = data.chunks_exact(stride);
        for batch in &mut batches {
            self.absorb(batch);
        }

        let rest = batches.remainder();
        let full = rest.len() - rest.len() % BLOCK_SIZE;
        if full > 0 {
            self.absorb(&rest[..full]);
        }
        if full < rest.len() {
            let mut block = [0u8; BLOCK_SIZE];
            block[..rest.len() - full].copy_from_slice(&rest[full..]);
            self.absorb(&block);
        }
    }

    /// Absorb the length block; lengths are given in bytes.
    pub fn update_lengths(&mut self, aad_len: u64, text_len: u64) {
        let lengths = FieldElement::from_lengths(aad_len << 3, text_len << 3);
        self.absorb(&lengths.to_block());
    }

    /// Current accumulator.
    pub const fn accumulator(&self) -> FieldElement {
        self.acc
    }

    /// Final GHASH value in GCM byte order.
    pub fn finish(self) -> Block {
        self.acc.to_block()
    }

    /// 1..=batch whole blocks, one reduction.
    fn absorb(&mut self, blocks: &[u8]) {
        let powers = self.powers.as_slice();
        let n = blocks.len() / BLOCK_SIZE;
        let mut wide = WideProduct::default();
        for (i, chunk) in blocks.chunks_exact(BLOCK_SIZE).enumerate() {
            let mut x = FieldElement::load(chunk);
            if i == 0 {
                x ^= self.acc;
            }
            wide ^= multiply_wide(self.kernel, x, powers[n - 1 - i]);
        }
        self.acc = reduce(self.kernel, wide);
    }
}

/// One-shot GHASH of `aad` and `text` with the length block, as used for
/// the tag (before masking with `E(K, J0)`).
pub fn ghash<K: Kernel>(kernel: K, powers: &HashPowers, aad: &[u8], text: &[u8]) -> Block {
    let mut hasher = GaloisHash::new(kernel, powers);
    hasher.update(aad);
    hasher.update(text);
    hasher.update_lengths(aad.len() as u64, text.len() as u64);
    hasher.finish()
}
