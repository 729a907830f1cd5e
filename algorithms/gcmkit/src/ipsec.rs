//! IPsec ESP Fast Path
//!
//! ESP packets carry the tag directly after the ciphertext, so both entry
//! points take a single packet buffer laid out as:
//!
//! ```text
//! +---------------------------+---------------------+
//! | payload (text_len bytes)  | tag (tag_len bytes) |
//! +---------------------------+---------------------+
//! ```
//!
//! The nonce is the 4-byte SA salt followed by the 8-byte explicit IV. The
//! AAD is the ESP header (SPI + sequence number, or SPI + extended sequence
//! number): 8 or 12 bytes.
//!
//! Decryption runs GHASH, CTR and an RFC 1071 checksum over the payload in
//! one pass. The final partial block is stored as a whole zero-padded block
//! clipped to the packet end, which may overwrite the tag slot; the tag
//! bytes are saved beforehand and restored verbatim afterwards.

use crate::aead::{tags_match, CipherConstants, CipherState};
use crate::engine::dispatcher::with_kernel;
use crate::ghash::GaloisHash;
use crate::kernels::constants::{
    BLOCK_SIZE, DIRECT_NONCE_SIZE, KEYSTREAM_BATCH, MAX_PLAINTEXT_LEN, TAG_SIZE,
};
use crate::kernels::Kernel;
use crate::keystream::{Counter, CounterKeystream};
use crate::types::{Block, Error, SetupError};
use zeroize::Zeroize;

/// SA salt length.
pub const SALT_SIZE: usize = 4;

/// Explicit IV length carried in each packet.
pub const ESP_IV_SIZE: usize = 8;

/// AAD lengths: SPI + 32-bit sequence number, or SPI + 64-bit ESN.
pub const ESP_AAD_LENGTHS: [usize; 2] = [8, 12];

const CHUNK_SIZE: usize = KEYSTREAM_BATCH * BLOCK_SIZE;

// =============================================================================
// CHECKSUM
// =============================================================================

/// One's-complement sum (RFC 1071) accumulated in 64-bit words.
///
/// Words are summed big-endian with end-around carry, which is congruent to
/// the 16-bit sum mod 0xFFFF. Every `update` except the last must cover a
/// multiple of 8 bytes so word alignment is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum(u64);

impl Checksum {
    /// Empty sum.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Add `data`; a trailing partial word is zero-padded.
    pub fn update(&mut self, data: &[u8]) {
        let mut words = data.chunks_exact(8);
        for word in &mut words {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(word);
            self.add(u64::from_be_bytes(bytes));
        }
        let tail = words.remainder();
        if !tail.is_empty() {
            let mut bytes = [0u8; 8];
            bytes[..tail.len()].copy_from_slice(tail);
            self.add(u64::from_be_bytes(bytes));
        }
    }

    fn add(&mut self, word: u64) {
        let (sum, carry) = self.0.overflowing_add(word);
        self.0 = sum + u64::from(carry);
    }

    /// The 64-bit running sum.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Fold to 16 bits with end-around carry.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn fold(self) -> u16 {
        let mut sum = self.0;
        while sum > 0xFFFF {
            sum = (sum & 0xFFFF) + (sum >> 16);
        }
        sum as u16
    }

    /// Internet checksum field value: complement of the folded sum.
    #[must_use]
    pub const fn finalize(self) -> u16 {
        !self.fold()
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Encrypt `packet[..len - tag_len]` in place and write the tag into the
/// trailing `tag_len` bytes.
///
/// # Errors
/// `Error::Setup` for an AAD that is not 8 or 12 bytes or a packet shorter
/// than the tag.
pub fn encrypt_from_constants_ipsec(
    constants: &CipherConstants,
    salt: &[u8; SALT_SIZE],
    esp_iv: &[u8; ESP_IV_SIZE],
    aad: &[u8],
    packet: &mut [u8],
) -> Result<(), Error> {
    let text_len = check_packet(constants, aad, packet)?;
    let mut state = CipherState::new(constants, &esp_nonce(salt, esp_iv))?;

    let (payload, tag_slot) = packet.split_at_mut(text_len);
    let mut tag = [0u8; TAG_SIZE];
    state.encrypt_in_place(aad, payload, &mut tag)?;
    tag_slot.copy_from_slice(&tag[..tag_slot.len()]);
    Ok(())
}

/// Decrypt `packet[..len - tag_len]` in place, verify the trailing tag and
/// return the one's-complement checksum of the recovered plaintext.
///
/// The tag bytes are unchanged on return. Plaintext is written before the
/// comparison completes and is left in place on failure.
///
/// # Errors
/// `Error::AuthenticationFailure` on mismatch; `Error::Setup` as for
/// [`encrypt_from_constants_ipsec`].
pub fn decrypt_from_constants_ipsec(
    constants: &CipherConstants,
    salt: &[u8; SALT_SIZE],
    esp_iv: &[u8; ESP_IV_SIZE],
    aad: &[u8],
    packet: &mut [u8],
) -> Result<Checksum, Error> {
    let text_len = check_packet(constants, aad, packet)?;
    let tag_len = constants.tag_byte_length();
    let j0 = Counter::new(esp_j0(salt, esp_iv));

    let mut saved = [0u8; TAG_SIZE];
    saved[..tag_len].copy_from_slice(&packet[text_len..]);

    let kernel = constants.kernel();
    let (mut computed, checksum) = with_kernel!(kernel, k => {
        open_fused(k, constants, j0, aad, packet, text_len)
    });

    packet[text_len..].copy_from_slice(&saved[..tag_len]);
    let ok = tags_match(&computed[..tag_len], &saved[..tag_len]);
    computed.zeroize();

    if bool::from(ok) {
        Ok(checksum)
    } else {
        tracing::debug!(len = text_len, "ESP tag mismatch");
        Err(Error::AuthenticationFailure)
    }
}

// =============================================================================
// INTERNALS
// =============================================================================

fn check_packet(
    constants: &CipherConstants,
    aad: &[u8],
    packet: &[u8],
) -> Result<usize, SetupError> {
    if !ESP_AAD_LENGTHS.contains(&aad.len()) {
        return Err(SetupError::AadLength(aad.len()));
    }
    let tag_len = constants.tag_byte_length();
    let text_len = packet
        .len()
        .checked_sub(tag_len)
        .ok_or(SetupError::BufferLength {
            expected: tag_len,
            actual: packet.len(),
        })?;
    if text_len as u64 > MAX_PLAINTEXT_LEN {
        return Err(SetupError::MessageTooLong);
    }
    Ok(text_len)
}

fn esp_nonce(salt: &[u8; SALT_SIZE], esp_iv: &[u8; ESP_IV_SIZE]) -> [u8; DIRECT_NONCE_SIZE] {
    let mut nonce = [0u8; DIRECT_NONCE_SIZE];
    nonce[..SALT_SIZE].copy_from_slice(salt);
    nonce[SALT_SIZE..].copy_from_slice(esp_iv);
    nonce
}

fn esp_j0(salt: &[u8; SALT_SIZE], esp_iv: &[u8; ESP_IV_SIZE]) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    block[..DIRECT_NONCE_SIZE].copy_from_slice(&esp_nonce(salt, esp_iv));
    block[BLOCK_SIZE - 1] = 1;
    block
}

/// GHASH, CTR and checksum over `packet[..text_len]`; returns the full tag.
fn open_fused<K: Kernel>(
    kernel: K,
    constants: &CipherConstants,
    j0: Counter,
    aad: &[u8],
    packet: &mut [u8],
    text_len: usize,
) -> (Block, Checksum) {
    let round_keys = constants.round_keys();
    let mut hasher = GaloisHash::new(kernel, constants.powers());
    hasher.update(aad);

    let mut mask = j0.to_block();
    kernel.encrypt_block(round_keys, &mut mask);

    let mut stream = CounterKeystream::new(kernel, round_keys, j0.incremented());
    let mut checksum = Checksum::new();

    let full = text_len - text_len % BLOCK_SIZE;
    for chunk in packet[..full].chunks_mut(CHUNK_SIZE) {
        hasher.update(chunk);
        stream.apply(chunk);
        checksum.update(chunk);
    }

    let rem = text_len - full;
    if rem > 0 {
        let mut last = [0u8; BLOCK_SIZE];
        last[..rem].copy_from_slice(&packet[full..text_len]);
        hasher.update(&last[..rem]);
        stream.apply(&mut last[..rem]);
        checksum.update(&last);

        // Whole-block store, clipped to the buffer: runs into the tag slot.
        let end = (full + BLOCK_SIZE).min(packet.len());
        packet[full..end].copy_from_slice(&last[..end - full]);
        last.zeroize();
    }

    hasher.update_lengths(aad.len() as u64, text_len as u64);
    let mut tag = hasher.finish();
    for (t, m) in tag.iter_mut().zip(mask) {
        *t ^= m;
    }
    mask.zeroize();
    (tag, checksum)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::CipherMode;

    #[test]
    fn checksum_rfc1071_example() {
        // RFC 1071 section 3: 00 01 f2 03 f4 f5 f6 f7 sums to ddf2.
        let mut sum = Checksum::new();
        sum.update(&[0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7]);
        assert_eq!(sum.fold(), 0xddf2);
        assert_eq!(sum.finalize(), !0xddf2);
    }

    #[test]
    fn checksum_end_around_carry() {
        let mut sum = Checksum::new();
        sum.update(&[0xFF; 16]);
        assert_eq!(sum.fold(), 0xFFFF);

        let mut odd = Checksum::new();
        odd.update(&[0xAB]);
        assert_eq!(odd.fold(), 0xAB00);
    }

    #[test]
    fn rejects_bad_aad_length() {
        let c = CipherConstants::new(CipherMode::Gcm128, 16, &[0u8; 16]).unwrap();
        let mut packet = [0u8; 32];
        assert_eq!(
            encrypt_from_constants_ipsec(&c, &[0; 4], &[0; 8], &[0; 10], &mut packet),
            Err(Error::Setup(SetupError::AadLength(10)))
        );
    }

    #[test]
    fn rejects_packet_shorter_than_tag() {
        let c = CipherConstants::new(CipherMode::Gcm128, 12, &[0u8; 16]).unwrap();
        let mut packet = [0u8; 11];
        assert_eq!(
            decrypt_from_constants_ipsec(&c, &[0; 4], &[0; 8], &[0; 8], &mut packet),
            Err(Error::Setup(SetupError::BufferLength {
                expected: 12,
                actual: 11
            }))
        );
    }
}
