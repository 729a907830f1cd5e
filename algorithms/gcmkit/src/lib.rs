#![cfg_attr(not(feature = "std"), no_std)]

//! # gcmkit
//!
//! AES-GCM authenticated encryption for 128, 192 and 256-bit keys, with an
//! IPsec ESP fast path that fuses decryption with an RFC 1071 checksum.
//! Accelerated by AES-NI + PCLMULQDQ, with a portable fallback.

//! # Usage
//! ```rust
//! use gcmkit::{CipherConstants, CipherMode, CipherState};
//!
//! // 1. One-shot
//! let key = [0x42u8; 16];
//! let nonce = [0x24u8; 12];
//! let (ct, tag) = gcmkit::encrypt_full(CipherMode::Gcm128, &key, &nonce, b"hdr", b"secret")?;
//! let pt = gcmkit::decrypt_full(CipherMode::Gcm128, &key, &nonce, b"hdr", &ct, tag.as_bytes())?;
//! assert_eq!(pt, b"secret");
//!
//! // 2. Reusable key, in-place messages
//! let constants = CipherConstants::new(CipherMode::Gcm128, 16, &key)?;
//! let mut state = CipherState::new(&constants, &nonce)?;
//! let mut buffer = *b"packet payload";
//! let mut tag = [0u8; 16];
//! state.encrypt_in_place(b"hdr", &mut buffer, &mut tag)?;
//!
//! state.reset();
//! state.decrypt_in_place(b"hdr", &mut buffer, &tag)?;
//! assert_eq!(&buffer, b"packet payload");
//! # Ok::<(), gcmkit::Error>(())
//! ```

// =============================================================================
// MODULES
// =============================================================================

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod aead;
mod engine;
#[cfg(feature = "std")]
mod ffi;
pub mod ghash;
pub mod ipsec;
// Re-export internal kernels for benchmarking/testing, but hide from docs
#[doc(hidden)]
pub mod kernels;
pub mod key_schedule;
pub mod keystream;
mod oneshot;
pub(crate) mod types;

// =============================================================================
// EXPORTS
// =============================================================================

pub use aead::{CipherConstants, CipherState, Phase};
#[cfg(feature = "std")]
pub use ffi::{
    gcmkit_constants_free, gcmkit_constants_new, gcmkit_decrypt_from_constants,
    gcmkit_decrypt_from_constants_ipsec, gcmkit_decrypt_full, gcmkit_encrypt_from_constants,
    gcmkit_encrypt_from_constants_ipsec, gcmkit_encrypt_full, gcmkit_get_backend_name,
    GcmConstants, GCMKIT_ERR_AUTH, GCMKIT_ERR_NULL, GCMKIT_ERR_PANIC, GCMKIT_ERR_SETUP, GCMKIT_OK,
};
pub use ghash::FieldElement;
pub use ipsec::{decrypt_from_constants_ipsec, encrypt_from_constants_ipsec, Checksum};
pub use keystream::Counter;
pub use oneshot::{
    decrypt_from_state, decrypt_full, encrypt_from_state, encrypt_full, set_constants, set_counter,
};
pub use types::{Backend, Block, CipherMode, Error, GcmConfig, SetupError, Tag};

/// Returns the name of the hardware backend currently in use.
#[must_use]
pub fn active_backend() -> &'static str {
    engine::get_active_backend_name()
}
