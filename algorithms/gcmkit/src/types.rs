//! Shared types used across the gcmkit library.

use crate::kernels::constants::{
    BLOCK_SIZE, DEFAULT_HASH_BATCH, MAX_HASH_BATCH, TAG_SIZE, VALID_TAG_LENGTHS,
};
use core::fmt;
#[cfg(feature = "std")]
use std::error;

/// One 128-bit AES / GHASH block.
pub type Block = [u8; BLOCK_SIZE];

// =============================================================================
// CIPHER MODE
// =============================================================================

/// AES-GCM key size selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    /// AES-128-GCM: 16-byte key, 11 round keys.
    Gcm128,
    /// AES-192-GCM: 24-byte key, 13 round keys.
    Gcm192,
    /// AES-256-GCM: 32-byte key, 15 round keys.
    Gcm256,
}

impl CipherMode {
    /// Key length in bytes.
    #[must_use]
    pub const fn key_len(self) -> usize {
        match self {
            Self::Gcm128 => 16,
            Self::Gcm192 => 24,
            Self::Gcm256 => 32,
        }
    }

    /// Number of 16-byte round keys in the expanded schedule.
    #[must_use]
    pub const fn round_key_count(self) -> usize {
        self.rounds() + 1
    }

    /// Number of AES rounds (10/12/14).
    #[must_use]
    pub const fn rounds(self) -> usize {
        match self {
            Self::Gcm128 => 10,
            Self::Gcm192 => 12,
            Self::Gcm256 => 14,
        }
    }

    /// Map a key size in bits (128/192/256) to a mode.
    #[must_use]
    pub const fn from_key_bits(bits: u32) -> Option<Self> {
        match bits {
            128 => Some(Self::Gcm128),
            192 => Some(Self::Gcm192),
            256 => Some(Self::Gcm256),
            _ => None,
        }
    }

    /// Pick the mode whose key length matches `key`.
    ///
    /// # Errors
    /// Returns `SetupError::KeyLength` for any length other than 16, 24 or 32.
    pub const fn for_key(key: &[u8]) -> Result<Self, SetupError> {
        match key.len() {
            16 => Ok(Self::Gcm128),
            24 => Ok(Self::Gcm192),
            32 => Ok(Self::Gcm256),
            actual => Err(SetupError::KeyLength {
                mode: None,
                actual,
            }),
        }
    }
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gcm128 => f.write_str("AES-128-GCM"),
            Self::Gcm192 => f.write_str("AES-192-GCM"),
            Self::Gcm256 => f.write_str("AES-256-GCM"),
        }
    }
}

// =============================================================================
// TAG
// =============================================================================

/// Authentication tag: a full 16-byte slot plus the configured length.
///
/// Truncated tags are the leading bytes of the full GCM tag; slot bytes past
/// the configured length are zero.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    bytes: [u8; TAG_SIZE],
    len: usize,
}

impl Tag {
    pub(crate) const fn new(bytes: [u8; TAG_SIZE], len: usize) -> Self {
        Self { bytes, len }
    }

    /// The tag truncated to its configured length.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// The full 16-byte tag slot.
    #[must_use]
    pub const fn as_block(&self) -> &[u8; TAG_SIZE] {
        &self.bytes
    }

    /// Configured tag length in bytes.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        self.len
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag(")?;
        for b in self.as_bytes() {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Hardware backend executing the AES rounds and carry-less multiplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Pure Rust, runs everywhere.
    Portable,
    /// x86_64 AES-NI + PCLMULQDQ.
    AesNi,
}

impl Backend {
    /// Human-readable backend name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Portable => "Portable",
            Self::AesNi => "AES-NI + PCLMULQDQ",
        }
    }
}

/// Runtime configuration for `CipherConstants`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcmConfig {
    /// Tag length in bytes; one of 4, 8, 12, 13, 14, 15, 16.
    pub tag_byte_length: usize,
    /// Number of precomputed powers of H (GHASH Horner batch), 1..=8.
    pub hash_batch: usize,
    /// Forced backend, or `None` for automatic selection.
    pub backend: Option<Backend>,
}

impl GcmConfig {
    /// Defaults: 16-byte tag, batch of 4, automatic backend.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tag_byte_length: TAG_SIZE,
            hash_batch: DEFAULT_HASH_BATCH,
            backend: None,
        }
    }

    /// Set the tag length in bytes.
    #[must_use]
    pub const fn with_tag_length(mut self, tag_byte_length: usize) -> Self {
        self.tag_byte_length = tag_byte_length;
        self
    }

    /// Set the number of precomputed powers of H.
    #[must_use]
    pub const fn with_hash_batch(mut self, hash_batch: usize) -> Self {
        self.hash_batch = hash_batch;
        self
    }

    /// Force a specific backend.
    #[must_use]
    pub const fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Check tag length and batch size.
    ///
    /// # Errors
    /// `SetupError::TagLength` or `SetupError::HashBatch`.
    pub fn validate(&self) -> Result<(), SetupError> {
        if !VALID_TAG_LENGTHS.contains(&self.tag_byte_length) {
            return Err(SetupError::TagLength(self.tag_byte_length));
        }
        if self.hash_batch == 0 || self.hash_batch > MAX_HASH_BATCH {
            return Err(SetupError::HashBatch(self.hash_batch));
        }
        Ok(())
    }
}

impl Default for GcmConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Rejected inputs, detected before any output is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    /// Key length does not match the requested mode (or any mode).
    KeyLength {
        /// Requested mode, if one was given.
        mode: Option<CipherMode>,
        /// Supplied key length in bytes.
        actual: usize,
    },
    /// Tag length outside {4, 8, 12, 13, 14, 15, 16}.
    TagLength(usize),
    /// Nonce of unsupported length (empty).
    NonceLength(usize),
    /// Bit length that is not a whole number of bytes.
    BitLength(u64),
    /// Hash batch outside 1..=8.
    HashBatch(usize),
    /// IPsec AAD length other than 8 or 12 bytes.
    AadLength(usize),
    /// Output buffer too small, or input/output lengths disagree.
    BufferLength {
        /// Bytes required.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
    /// Plaintext or AAD beyond GCM's per-invocation limits.
    MessageTooLong,
    /// Requested backend needs a CPU feature that is not present.
    CpuFeature(&'static str),
    /// Key size in bits that names no mode.
    UnsupportedMode(u32),
    /// The state was already used; call `reset` or `set_counter` first.
    StateFinalized,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyLength {
                mode: Some(mode),
                actual,
            } => write!(
                f,
                "{mode} requires a {}-byte key, got {actual} bytes",
                mode.key_len()
            ),
            Self::KeyLength { mode: None, actual } => {
                write!(f, "key must be 16, 24 or 32 bytes, got {actual} bytes")
            }
            Self::TagLength(len) => write!(
                f,
                "tag length {len} not supported (expected 4, 8, 12, 13, 14, 15 or 16)"
            ),
            Self::NonceLength(len) => write!(f, "nonce length {len} not supported"),
            Self::BitLength(bits) => write!(f, "bit length {bits} is not a multiple of 8"),
            Self::HashBatch(n) => write!(f, "hash batch {n} outside 1..=8"),
            Self::AadLength(len) => write!(f, "IPsec AAD must be 8 or 12 bytes, got {len}"),
            Self::BufferLength { expected, actual } => {
                write!(f, "buffer length {actual}, expected {expected}")
            }
            Self::MessageTooLong => f.write_str("message exceeds GCM length limits"),
            Self::CpuFeature(missing) => {
                write!(f, "CPU feature '{missing}' required by the selected backend")
            }
            Self::UnsupportedMode(bits) => write!(f, "no AES-GCM mode for {bits}-bit keys"),
            Self::StateFinalized => f.write_str("cipher state already used; reset it first"),
        }
    }
}

#[cfg(feature = "std")]
impl error::Error for SetupError {}

/// Errors returned by encrypt/decrypt entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Invalid parameters; nothing was computed.
    Setup(SetupError),
    /// Computed tag differs from the supplied tag.
    ///
    /// In-place and caller-buffer decrypts have already written the
    /// unauthenticated plaintext; the caller must discard it.
    AuthenticationFailure,
    /// Unreachable code path.
    Internal(&'static str),
}

impl Error {
    /// `true` if this is a tag mismatch.
    #[must_use]
    pub const fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailure)
    }
}

impl From<SetupError> for Error {
    fn from(err: SetupError) -> Self {
        Self::Setup(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup(err) => write!(f, "setup error: {err}"),
            Self::AuthenticationFailure => f.write_str("authentication failure"),
            Self::Internal(what) => write!(f, "internal error: {what}"),
        }
    }
}

#[cfg(feature = "std")]
impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Setup(err) => Some(err),
            _ => None,
        }
    }
}
