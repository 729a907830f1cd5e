//! AES-GCM AEAD Engine
//!
//! [`CipherConstants`] holds everything derived from the key (round keys,
//! hash subkey, powers of H) and is shared read-only between messages.
//! [`CipherState`] is the per-message half: the counter block and the GHASH
//! accumulator, borrowed against one set of constants.
//!
//! ```text
//! set_constants -> CipherState::new(nonce) -> encrypt | decrypt -> Finalized
//!                          ^                                          |
//!                          +------------ reset / set_counter ---------+
//! ```
//!
//! # Unauthenticated plaintext
//!
//! `decrypt` and `decrypt_in_place` write plaintext to the caller's buffer
//! before the tag comparison completes and do not clear it on
//! [`Error::AuthenticationFailure`]. Callers must discard the buffer on any
//! error.

use crate::engine::dispatcher::{self, with_kernel, KernelChoice};
use crate::ghash::{derive_h, FieldElement, GaloisHash, HashPowers};
use crate::kernels::constants::{
    BLOCK_SIZE, DIRECT_NONCE_SIZE, KEYSTREAM_BATCH, MAX_AAD_LEN, MAX_PLAINTEXT_LEN, TAG_SIZE,
};
use crate::kernels::Kernel;
use crate::key_schedule::{self, RoundKeys};
use crate::keystream::{Counter, CounterKeystream};
use crate::types::{Backend, Block, CipherMode, Error, GcmConfig, SetupError};
use core::fmt;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// Bytes encrypted and hashed per pass over the buffer.
const CHUNK_SIZE: usize = KEYSTREAM_BATCH * BLOCK_SIZE;

// =============================================================================
// CONSTANTS (PER KEY)
// =============================================================================

/// Key-derived material, immutable after construction.
pub struct CipherConstants {
    round_keys: RoundKeys,
    hash_powers: HashPowers,
    hash_key: Block,
    mode: CipherMode,
    tag_byte_length: usize,
    kernel: KernelChoice,
}

impl CipherConstants {
    /// Expand `key` with default configuration and the given tag length.
    ///
    /// # Errors
    /// `Error::Setup` for a bad key length or tag length.
    pub fn new(mode: CipherMode, tag_byte_length: usize, key: &[u8]) -> Result<Self, Error> {
        Self::with_config(
            mode,
            key,
            &GcmConfig::new().with_tag_length(tag_byte_length),
        )
    }

    /// Expand `key` under an explicit configuration.
    ///
    /// # Errors
    /// `Error::Setup` for a bad key, tag length, hash batch, or a forced
    /// backend the CPU lacks.
    pub fn with_config(mode: CipherMode, key: &[u8], config: &GcmConfig) -> Result<Self, Error> {
        let _span = tracing::trace_span!(
            "gcm_setup",
            %mode,
            tag_len = config.tag_byte_length,
            batch = config.hash_batch
        )
        .entered();

        config.validate()?;
        let kernel = dispatcher::select(config.backend)?;
        let round_keys = key_schedule::expand(mode, key)?;

        let (h, hash_powers) = with_kernel!(kernel, k => {
            let h = derive_h(k, round_keys.as_slice());
            (h, HashPowers::new(k, h, config.hash_batch))
        });

        Ok(Self {
            round_keys,
            hash_powers,
            hash_key: h.to_block(),
            mode,
            tag_byte_length: config.tag_byte_length,
            kernel,
        })
    }

    /// Key size.
    #[must_use]
    pub const fn mode(&self) -> CipherMode {
        self.mode
    }

    /// Tag length in bytes.
    #[must_use]
    pub const fn tag_byte_length(&self) -> usize {
        self.tag_byte_length
    }

    /// Expanded AES key (`mode.round_key_count()` blocks).
    #[must_use]
    pub fn round_keys(&self) -> &[Block] {
        self.round_keys.as_slice()
    }

    /// Twisted powers of H, `hash_powers()[0]` being H itself.
    #[must_use]
    pub fn hash_powers(&self) -> &[FieldElement] {
        self.hash_powers.as_slice()
    }

    /// The GHASH subkey `H = E(K, 0^128)` in GCM byte order.
    #[must_use]
    pub const fn hash_key(&self) -> &Block {
        &self.hash_key
    }

    /// Backend executing this key's operations.
    #[must_use]
    pub fn backend(&self) -> Backend {
        self.kernel.backend()
    }

    pub(crate) const fn kernel(&self) -> KernelChoice {
        self.kernel
    }

    pub(crate) const fn powers(&self) -> &HashPowers {
        &self.hash_powers
    }

    /// Pre-counter block J0 for `nonce`.
    pub(crate) fn derive_j0(&self, nonce: &[u8]) -> Result<Counter, SetupError> {
        if nonce.is_empty() {
            return Err(SetupError::NonceLength(0));
        }

        if nonce.len() == DIRECT_NONCE_SIZE {
            let mut block = [0u8; BLOCK_SIZE];
            block[..DIRECT_NONCE_SIZE].copy_from_slice(nonce);
            block[BLOCK_SIZE - 1] = 1;
            return Ok(Counter::new(block));
        }

        let block = with_kernel!(self.kernel, k => {
            let mut hasher = GaloisHash::new(k, &self.hash_powers);
            hasher.update(nonce);
            hasher.update_lengths(0, nonce.len() as u64);
            hasher.finish()
        });
        Ok(Counter::new(block))
    }
}

impl fmt::Debug for CipherConstants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherConstants")
            .field("mode", &self.mode)
            .field("tag_byte_length", &self.tag_byte_length)
            .field("hash_batch", &self.hash_powers.len())
            .field("backend", &self.backend())
            .finish_non_exhaustive()
    }
}

impl Drop for CipherConstants {
    fn drop(&mut self) {
        self.hash_key.zeroize();
    }
}

// =============================================================================
// STATE (PER MESSAGE)
// =============================================================================

/// Lifecycle of a [`CipherState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nonce set, accumulator zero; ready for one encrypt or decrypt.
    CounterReady,
    /// One operation ran; `reset` or `set_counter` before the next.
    Finalized,
}

#[derive(Clone, Copy)]
enum Direction {
    Seal,
    Open,
}

/// Counter and GHASH accumulator for one message.
pub struct CipherState<'c> {
    constants: &'c CipherConstants,
    initial: Counter,
    counter: Counter,
    accumulator: FieldElement,
    phase: Phase,
}

impl<'c> CipherState<'c> {
    /// Derive the counter from `nonce`. 12-byte nonces are used directly,
    /// any other length goes through GHASH.
    ///
    /// # Errors
    /// `SetupError::NonceLength` for an empty nonce.
    pub fn new(constants: &'c CipherConstants, nonce: &[u8]) -> Result<Self, Error> {
        let initial = constants.derive_j0(nonce)?;
        Ok(Self {
            constants,
            initial,
            counter: initial,
            accumulator: FieldElement::ZERO,
            phase: Phase::CounterReady,
        })
    }

    /// Install a new nonce and clear the accumulator.
    ///
    /// # Errors
    /// `SetupError::NonceLength` for an empty nonce.
    pub fn set_counter(&mut self, nonce: &[u8]) -> Result<(), Error> {
        self.initial = self.constants.derive_j0(nonce)?;
        self.reset();
        Ok(())
    }

    /// Return to the post-setup counter with a zero accumulator.
    pub fn reset(&mut self) {
        self.counter = self.initial;
        self.accumulator = FieldElement::ZERO;
        self.phase = Phase::CounterReady;
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current counter block (J0 until an operation runs).
    #[must_use]
    pub const fn counter(&self) -> Counter {
        self.counter
    }

    /// Running GHASH value.
    #[must_use]
    pub const fn tag_accumulator(&self) -> FieldElement {
        self.accumulator
    }

    /// The constants this state was built from.
    #[must_use]
    pub const fn constants(&self) -> &'c CipherConstants {
        self.constants
    }

    /// Encrypt `plaintext` into `ciphertext_out` (at least as long).
    ///
    /// `tag_out` receives the tag in its first `tag_byte_length` bytes; the
    /// rest of the slot is zeroed.
    ///
    /// # Errors
    /// `Error::Setup` for a short output buffer, oversized input, or a
    /// finalized state.
    pub fn encrypt(
        &mut self,
        aad: &[u8],
        plaintext: &[u8],
        ciphertext_out: &mut [u8],
        tag_out: &mut [u8; TAG_SIZE],
    ) -> Result<(), Error> {
        let out = output_slice(ciphertext_out, plaintext.len())?;
        self.begin(aad.len(), plaintext.len())?;
        out.copy_from_slice(plaintext);
        self.seal(aad, out, tag_out);
        Ok(())
    }

    /// Encrypt `buffer` in place.
    ///
    /// # Errors
    /// `Error::Setup` for oversized input or a finalized state.
    pub fn encrypt_in_place(
        &mut self,
        aad: &[u8],
        buffer: &mut [u8],
        tag_out: &mut [u8; TAG_SIZE],
    ) -> Result<(), Error> {
        self.begin(aad.len(), buffer.len())?;
        self.seal(aad, buffer, tag_out);
        Ok(())
    }

    /// Decrypt `ciphertext` into `plaintext_out` and verify `tag`.
    ///
    /// Plaintext is written before verification finishes and is left in
    /// place on failure.
    ///
    /// # Errors
    /// `Error::AuthenticationFailure` on tag mismatch; `Error::Setup` for a
    /// short output buffer, a tag of the wrong length, oversized input, or a
    /// finalized state.
    pub fn decrypt(
        &mut self,
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        plaintext_out: &mut [u8],
    ) -> Result<(), Error> {
        let out = output_slice(plaintext_out, ciphertext.len())?;
        self.check_tag_len(tag)?;
        self.begin(aad.len(), ciphertext.len())?;
        out.copy_from_slice(ciphertext);
        self.open(aad, out, tag)
    }

    /// Decrypt `buffer` in place and verify `tag`.
    ///
    /// Plaintext is written before verification finishes and is left in
    /// place on failure.
    ///
    /// # Errors
    /// As [`CipherState::decrypt`].
    pub fn decrypt_in_place(
        &mut self,
        aad: &[u8],
        buffer: &mut [u8],
        tag: &[u8],
    ) -> Result<(), Error> {
        self.check_tag_len(tag)?;
        self.begin(aad.len(), buffer.len())?;
        self.open(aad, buffer, tag)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    const fn check_tag_len(&self, tag: &[u8]) -> Result<(), SetupError> {
        if tag.len() == self.constants.tag_byte_length {
            Ok(())
        } else {
            Err(SetupError::TagLength(tag.len()))
        }
    }

    fn begin(&mut self, aad_len: usize, text_len: usize) -> Result<(), SetupError> {
        if self.phase == Phase::Finalized {
            return Err(SetupError::StateFinalized);
        }
        if text_len as u64 > MAX_PLAINTEXT_LEN || aad_len as u64 >= MAX_AAD_LEN {
            return Err(SetupError::MessageTooLong);
        }
        self.phase = Phase::Finalized;
        Ok(())
    }

    fn seal(&mut self, aad: &[u8], buffer: &mut [u8], tag_out: &mut [u8; TAG_SIZE]) {
        let kernel = self.constants.kernel;
        let mut full = with_kernel!(kernel, k => self.crypt(k, aad, buffer, Direction::Seal));
        let len = self.constants.tag_byte_length;
        tag_out.fill(0);
        tag_out[..len].copy_from_slice(&full[..len]);
        full.zeroize();
    }

    fn open(&mut self, aad: &[u8], buffer: &mut [u8], tag: &[u8]) -> Result<(), Error> {
        let kernel = self.constants.kernel;
        let mut full = with_kernel!(kernel, k => self.crypt(k, aad, buffer, Direction::Open));
        let ok = tags_match(&full[..self.constants.tag_byte_length], tag);
        full.zeroize();

        if bool::from(ok) {
            Ok(())
        } else {
            tracing::debug!(
                mode = %self.constants.mode,
                len = buffer.len(),
                "GCM tag mismatch"
            );
            Err(Error::AuthenticationFailure)
        }
    }

    /// Hash the AAD, run CTR over `buffer` while hashing the ciphertext side,
    /// absorb the length block and return the full 16-byte tag.
    fn crypt<K: Kernel>(
        &mut self,
        kernel: K,
        aad: &[u8],
        buffer: &mut [u8],
        direction: Direction,
    ) -> Block {
        let constants = self.constants;
        let round_keys = constants.round_keys();

        let mut hasher =
            GaloisHash::with_accumulator(kernel, &constants.hash_powers, self.accumulator);
        hasher.update(aad);

        let mut tag_mask = self.counter.to_block();
        kernel.encrypt_block(round_keys, &mut tag_mask);

        let mut stream = CounterKeystream::new(kernel, round_keys, self.counter.incremented());
        for chunk in buffer.chunks_mut(CHUNK_SIZE) {
            match direction {
                Direction::Seal => {
                    stream.apply(chunk);
                    hasher.update(chunk);
                }
                Direction::Open => {
                    hasher.update(chunk);
                    stream.apply(chunk);
                }
            }
        }
        hasher.update_lengths(aad.len() as u64, buffer.len() as u64);

        self.counter = stream.counter();
        self.accumulator = hasher.accumulator();

        let mut tag = self.accumulator.to_block();
        for (t, m) in tag.iter_mut().zip(tag_mask) {
            *t ^= m;
        }
        tag_mask.zeroize();
        tag
    }
}

impl fmt::Debug for CipherState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherState")
            .field("constants", self.constants)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl Drop for CipherState<'_> {
    fn drop(&mut self) {
        self.initial.zeroize();
        self.counter.zeroize();
        self.accumulator.zeroize();
    }
}

fn output_slice(out: &mut [u8], len: usize) -> Result<&mut [u8], SetupError> {
    let actual = out.len();
    out.get_mut(..len).ok_or(SetupError::BufferLength {
        expected: len,
        actual,
    })
}

// =============================================================================
// TAG COMPARISON
// =============================================================================

/// OR of the XOR of every byte pair, zero iff the common prefix matches.
///
/// Visits every pair regardless of where the first difference is; `observe`
/// is called with each index visited.
pub fn tag_difference(
    computed: &[u8],
    supplied: &[u8],
    mut observe: impl FnMut(usize),
) -> u8 {
    let mut diff = 0u8;
    for (i, (a, b)) in computed.iter().zip(supplied).enumerate() {
        observe(i);
        diff |= a ^ b;
    }
    diff
}

/// Constant-time tag equality, including the lengths.
#[must_use]
pub fn tags_match(computed: &[u8], supplied: &[u8]) -> Choice {
    let same_len = (computed.len() as u64).ct_eq(&(supplied.len() as u64));
    same_len & tag_difference(computed, supplied, |_| {}).ct_eq(&0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn constants(tag_len: usize) -> CipherConstants {
        CipherConstants::new(CipherMode::Gcm128, tag_len, &[0u8; 16]).unwrap()
    }

    #[test]
    fn compare_visits_every_byte() {
        let computed = [0x42u8; 16];
        for position in [0, 7, 15] {
            let mut supplied = computed;
            supplied[position] ^= 1;
            let mut visited = 0;
            let diff = tag_difference(&computed, &supplied, |_| visited += 1);
            assert_ne!(diff, 0);
            assert_eq!(visited, 16, "mismatch at byte {position}");
        }

        let mut visited = 0;
        assert_eq!(tag_difference(&computed, &computed, |_| visited += 1), 0);
        assert_eq!(visited, 16);
    }

    #[test]
    fn tags_match_checks_length() {
        assert!(bool::from(tags_match(&[1, 2, 3, 4], &[1, 2, 3, 4])));
        assert!(!bool::from(tags_match(&[1, 2, 3, 4], &[1, 2, 3])));
        assert!(!bool::from(tags_match(&[1, 2, 3, 4], &[1, 2, 3, 5])));
    }

    #[test]
    fn direct_nonce_counter_layout() {
        let c = constants(16);
        let state = CipherState::new(&c, &[0xCA; 12]).unwrap();
        let block = state.counter().to_block();
        assert_eq!(block[..12], [0xCA; 12]);
        assert_eq!(state.counter().block_index(), 1);
        assert_eq!(state.phase(), Phase::CounterReady);
    }

    #[test]
    fn empty_nonce_rejected() {
        let c = constants(16);
        assert_eq!(
            CipherState::new(&c, &[]).err(),
            Some(Error::Setup(SetupError::NonceLength(0)))
        );
    }

    #[test]
    fn state_is_single_use_until_reset() {
        let c = constants(16);
        let mut state = CipherState::new(&c, &[1; 12]).unwrap();
        let mut tag = [0u8; 16];
        let mut buf = *b"hello";
        state.encrypt_in_place(b"", &mut buf, &mut tag).unwrap();
        assert_eq!(state.phase(), Phase::Finalized);
        assert_eq!(
            state.encrypt_in_place(b"", &mut buf, &mut tag),
            Err(Error::Setup(SetupError::StateFinalized))
        );

        state.reset();
        state.decrypt_in_place(b"", &mut buf, &tag).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn truncated_tag_zero_fills_slot() {
        let c = constants(12);
        let mut state = CipherState::new(&c, &[1; 12]).unwrap();
        let mut tag = [0xFFu8; 16];
        state.encrypt(b"aad", b"data", &mut [0u8; 4], &mut tag).unwrap();
        assert_eq!(tag[12..], [0u8; 4]);
    }

    #[test]
    fn short_output_rejected_before_work() {
        let c = constants(16);
        let mut state = CipherState::new(&c, &[1; 12]).unwrap();
        let mut tag = [0u8; 16];
        assert_eq!(
            state.encrypt(b"", b"abcdef", &mut [0u8; 3], &mut tag),
            Err(Error::Setup(SetupError::BufferLength {
                expected: 6,
                actual: 3
            }))
        );
        assert_eq!(state.phase(), Phase::CounterReady);
    }

    #[test]
    fn debug_hides_key_material() {
        let text = format!("{:?}", constants(16));
        assert!(text.contains("Gcm128"));
        assert!(!text.contains("round_keys"));
    }
}
