//! Public API Layer
//!
//! Allocating wrappers over [`CipherConstants`] and [`CipherState`]. The
//! `*_full` functions do key and nonce setup per call; the `*_from_state`
//! functions reuse a prepared state.

use crate::aead::{CipherConstants, CipherState};
use crate::kernels::constants::TAG_SIZE;
use crate::types::{CipherMode, Error, Tag};
use zeroize::Zeroize;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// =============================================================================
// SETUP
// =============================================================================

/// Expand a key into reusable constants.
///
/// # Example
/// ```rust
/// use gcmkit::{set_constants, CipherMode};
///
/// let constants = set_constants(CipherMode::Gcm128, 16, &[0u8; 16]).unwrap();
/// assert_eq!(constants.tag_byte_length(), 16);
/// ```
///
/// # Errors
/// `Error::Setup` for a key that does not fit `mode` or an invalid tag length.
pub fn set_constants(
    mode: CipherMode,
    tag_byte_length: usize,
    key: &[u8],
) -> Result<CipherConstants, Error> {
    CipherConstants::new(mode, tag_byte_length, key)
}

/// Install a nonce on an existing state, clearing its accumulator.
///
/// # Errors
/// `Error::Setup` for an empty nonce.
pub fn set_counter(state: &mut CipherState<'_>, nonce: &[u8]) -> Result<(), Error> {
    state.set_counter(nonce)
}

// =============================================================================
// ONE-SHOT
// =============================================================================

/// Encrypt with a 16-byte tag, returning `(ciphertext, tag)`.
///
/// # Example
/// ```rust
/// use gcmkit::{decrypt_full, encrypt_full, CipherMode};
///
/// let key = [7u8; 32];
/// let nonce = [1u8; 12];
/// let (ct, tag) = encrypt_full(CipherMode::Gcm256, &key, &nonce, b"hdr", b"payload").unwrap();
/// let pt = decrypt_full(CipherMode::Gcm256, &key, &nonce, b"hdr", &ct, tag.as_bytes()).unwrap();
/// assert_eq!(pt, b"payload");
/// ```
///
/// # Errors
/// `Error::Setup` for invalid key or nonce, or oversized input.
pub fn encrypt_full(
    mode: CipherMode,
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Tag), Error> {
    let constants = CipherConstants::new(mode, TAG_SIZE, key)?;
    let mut state = CipherState::new(&constants, nonce)?;
    encrypt_from_state(&mut state, aad, plaintext)
}

/// Decrypt and verify. The tag length is `tag.len()`.
///
/// # Errors
/// `Error::AuthenticationFailure` on mismatch (no plaintext is returned);
/// `Error::Setup` for invalid key, nonce or tag length.
pub fn decrypt_full(
    mode: CipherMode,
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, Error> {
    let constants = CipherConstants::new(mode, tag.len(), key)?;
    let mut state = CipherState::new(&constants, nonce)?;
    decrypt_from_state(&mut state, aad, ciphertext, tag)
}

// =============================================================================
// FROM STATE
// =============================================================================

/// Encrypt with a prepared state.
///
/// # Errors
/// `Error::Setup` for a finalized state or oversized input.
pub fn encrypt_from_state(
    state: &mut CipherState<'_>,
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Tag), Error> {
    let mut buffer = plaintext.to_vec();
    let mut slot = [0u8; TAG_SIZE];
    state.encrypt_in_place(aad, &mut buffer, &mut slot)?;
    Ok((buffer, Tag::new(slot, state.constants().tag_byte_length())))
}

/// Decrypt with a prepared state. The recovered plaintext is wiped and
/// dropped if the tag does not match.
///
/// # Errors
/// `Error::AuthenticationFailure` on mismatch; `Error::Setup` for a wrong
/// tag length, finalized state or oversized input.
pub fn decrypt_from_state(
    state: &mut CipherState<'_>,
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, Error> {
    let mut buffer = ciphertext.to_vec();
    match state.decrypt_in_place(aad, &mut buffer, tag) {
        Ok(()) => Ok(buffer),
        Err(err) => {
            buffer.zeroize();
            Err(err)
        }
    }
}
