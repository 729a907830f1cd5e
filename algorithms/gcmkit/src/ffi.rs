//! C-API Bindings
//!
//! Exposes gcmkit to C/C++ via FFI with pointer safety and panic boundaries.
//! Message lengths are passed in bits and must be whole bytes; the mode is
//! the key size in bits (128, 192 or 256).
//!
//! Every function returns one of the `GCMKIT_*` status codes.

#![allow(unsafe_code)]

use crate::aead::{CipherConstants, CipherState};
use crate::ipsec::{self, ESP_IV_SIZE, SALT_SIZE};
use crate::kernels::constants::TAG_SIZE;
use crate::types::{Backend, CipherMode, Error, SetupError};

use std::ffi::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::slice;

// =============================================================================
// STATUS CODES
// =============================================================================

/// Success.
pub const GCMKIT_OK: i32 = 0;
/// A required pointer was null.
pub const GCMKIT_ERR_NULL: i32 = -1;
/// A panic was caught at the boundary.
pub const GCMKIT_ERR_PANIC: i32 = -2;
/// Invalid parameters (mode, key, tag length, bit length, buffer size).
pub const GCMKIT_ERR_SETUP: i32 = -3;
/// Tag mismatch on decrypt.
pub const GCMKIT_ERR_AUTH: i32 = -4;

enum Failure {
    Null,
    Gcm(Error),
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        Self::Gcm(err)
    }
}

impl From<SetupError> for Failure {
    fn from(err: SetupError) -> Self {
        Self::Gcm(Error::Setup(err))
    }
}

fn guarded(body: impl FnOnce() -> Result<(), Failure>) -> i32 {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => GCMKIT_OK,
        Ok(Err(Failure::Null)) => GCMKIT_ERR_NULL,
        Ok(Err(Failure::Gcm(Error::AuthenticationFailure))) => GCMKIT_ERR_AUTH,
        Ok(Err(Failure::Gcm(_))) => GCMKIT_ERR_SETUP,
        Err(_) => GCMKIT_ERR_PANIC,
    }
}

// =============================================================================
// POINTER HELPERS
// =============================================================================

fn byte_len(bits: u64) -> Result<usize, SetupError> {
    if !bits.is_multiple_of(8) {
        return Err(SetupError::BitLength(bits));
    }
    usize::try_from(bits / 8).map_err(|_| SetupError::MessageTooLong)
}

fn mode_from_bits(bits: u32) -> Result<CipherMode, SetupError> {
    CipherMode::from_key_bits(bits).ok_or(SetupError::UnsupportedMode(bits))
}

/// Borrow `len` bytes; null is accepted only for `len == 0`.
unsafe fn input<'a>(ptr: *const u8, len: usize) -> Result<&'a [u8], Failure> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(Failure::Null);
    }
    Ok(slice::from_raw_parts(ptr, len))
}

/// Move `len` bytes from `src` to `dst` (they may overlap or be equal) and
/// borrow `dst` for in-place processing.
unsafe fn staged<'a>(src: *const u8, dst: *mut u8, len: usize) -> Result<&'a mut [u8], Failure> {
    if len == 0 {
        return Ok(&mut []);
    }
    if src.is_null() || dst.is_null() {
        return Err(Failure::Null);
    }
    ptr::copy(src, dst, len);
    Ok(slice::from_raw_parts_mut(dst, len))
}

unsafe fn tag_slot<'a>(ptr: *mut u8) -> Result<&'a mut [u8; TAG_SIZE], Failure> {
    ptr.cast::<[u8; TAG_SIZE]>().as_mut().ok_or(Failure::Null)
}

unsafe fn constants<'a>(handle: *const GcmConstants) -> Result<&'a CipherConstants, Failure> {
    handle.as_ref().map(|h| &h.0).ok_or(Failure::Null)
}

// =============================================================================
// CONSTANTS HANDLE
// =============================================================================

/// Opaque key handle for C.
pub struct GcmConstants(CipherConstants);

/// Expand a key. On success `*out` receives a handle that must be released
/// with `gcmkit_constants_free`.
///
/// # Safety
/// - `key_ptr` must be valid for `key_bits / 8` bytes
/// - `out` must be valid for one pointer write
#[no_mangle]
pub unsafe extern "C" fn gcmkit_constants_new(
    mode_bits: u32,
    tag_byte_length: usize,
    key_ptr: *const u8,
    key_bits: u64,
    out: *mut *mut GcmConstants,
) -> i32 {
    if key_ptr.is_null() || out.is_null() {
        return GCMKIT_ERR_NULL;
    }

    guarded(|| {
        let mode = mode_from_bits(mode_bits)?;
        let key = input(key_ptr, byte_len(key_bits)?)?;
        let constants = CipherConstants::new(mode, tag_byte_length, key)?;
        *out = Box::into_raw(Box::new(GcmConstants(constants)));
        Ok(())
    })
}

/// Release a handle (key material is wiped).
///
/// # Safety
/// - `handle` must come from `gcmkit_constants_new`, or be null
#[no_mangle]
pub unsafe extern "C" fn gcmkit_constants_free(handle: *mut GcmConstants) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

// =============================================================================
// ONE-SHOT API
// =============================================================================

/// Encrypt with a 16-byte tag.
///
/// # Safety
/// - input pointers must be valid for their bit lengths (null allowed for 0)
/// - `ct_out` must be valid for `pt_bits / 8` writable bytes (may equal `pt_ptr`)
/// - `tag_out` must be valid for 16 writable bytes
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn gcmkit_encrypt_full(
    mode_bits: u32,
    key_ptr: *const u8,
    key_bits: u64,
    nonce_ptr: *const u8,
    nonce_bits: u64,
    aad_ptr: *const u8,
    aad_bits: u64,
    pt_ptr: *const u8,
    pt_bits: u64,
    ct_out: *mut u8,
    tag_out: *mut u8,
) -> i32 {
    if key_ptr.is_null() || nonce_ptr.is_null() || tag_out.is_null() {
        return GCMKIT_ERR_NULL;
    }

    guarded(|| {
        let mode = mode_from_bits(mode_bits)?;
        let constants = CipherConstants::new(mode, TAG_SIZE, input(key_ptr, byte_len(key_bits)?)?)?;
        let mut state = CipherState::new(&constants, input(nonce_ptr, byte_len(nonce_bits)?)?)?;
        let aad = input(aad_ptr, byte_len(aad_bits)?)?;
        let buffer = staged(pt_ptr, ct_out, byte_len(pt_bits)?)?;
        state.encrypt_in_place(aad, buffer, tag_slot(tag_out)?)?;
        Ok(())
    })
}

/// Decrypt and verify a tag of `tag_byte_length` bytes.
///
/// Plaintext is written to `pt_out` before verification and left there on
/// `GCMKIT_ERR_AUTH`; the caller must discard it.
///
/// # Safety
/// - input pointers must be valid for their lengths (null allowed for 0)
/// - `pt_out` must be valid for `ct_bits / 8` writable bytes (may equal `ct_ptr`)
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn gcmkit_decrypt_full(
    mode_bits: u32,
    key_ptr: *const u8,
    key_bits: u64,
    nonce_ptr: *const u8,
    nonce_bits: u64,
    aad_ptr: *const u8,
    aad_bits: u64,
    ct_ptr: *const u8,
    ct_bits: u64,
    tag_ptr: *const u8,
    tag_byte_length: usize,
    pt_out: *mut u8,
) -> i32 {
    if key_ptr.is_null() || nonce_ptr.is_null() || tag_ptr.is_null() {
        return GCMKIT_ERR_NULL;
    }

    guarded(|| {
        let mode = mode_from_bits(mode_bits)?;
        let key = input(key_ptr, byte_len(key_bits)?)?;
        let constants = CipherConstants::new(mode, tag_byte_length, key)?;
        let mut state = CipherState::new(&constants, input(nonce_ptr, byte_len(nonce_bits)?)?)?;
        let aad = input(aad_ptr, byte_len(aad_bits)?)?;
        let tag = input(tag_ptr, tag_byte_length)?;
        let buffer = staged(ct_ptr, pt_out, byte_len(ct_bits)?)?;
        state.decrypt_in_place(aad, buffer, tag)?;
        Ok(())
    })
}

// =============================================================================
// FROM CONSTANTS
// =============================================================================

/// Encrypt under an existing handle. The tag length is the handle's.
///
/// # Safety
/// - `handle` must come from `gcmkit_constants_new`
/// - other pointers as for `gcmkit_encrypt_full`
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn gcmkit_encrypt_from_constants(
    handle: *const GcmConstants,
    nonce_ptr: *const u8,
    nonce_bits: u64,
    aad_ptr: *const u8,
    aad_bits: u64,
    pt_ptr: *const u8,
    pt_bits: u64,
    ct_out: *mut u8,
    tag_out: *mut u8,
) -> i32 {
    if handle.is_null() || nonce_ptr.is_null() || tag_out.is_null() {
        return GCMKIT_ERR_NULL;
    }

    guarded(|| {
        let constants = constants(handle)?;
        let mut state = CipherState::new(constants, input(nonce_ptr, byte_len(nonce_bits)?)?)?;
        let aad = input(aad_ptr, byte_len(aad_bits)?)?;
        let buffer = staged(pt_ptr, ct_out, byte_len(pt_bits)?)?;
        state.encrypt_in_place(aad, buffer, tag_slot(tag_out)?)?;
        Ok(())
    })
}

/// Decrypt under an existing handle; `tag_ptr` holds the handle's tag length.
///
/// Plaintext is left in `pt_out` on `GCMKIT_ERR_AUTH`.
///
/// # Safety
/// - `handle` must come from `gcmkit_constants_new`
/// - other pointers as for `gcmkit_decrypt_full`
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn gcmkit_decrypt_from_constants(
    handle: *const GcmConstants,
    nonce_ptr: *const u8,
    nonce_bits: u64,
    aad_ptr: *const u8,
    aad_bits: u64,
    ct_ptr: *const u8,
    ct_bits: u64,
    tag_ptr: *const u8,
    pt_out: *mut u8,
) -> i32 {
    if handle.is_null() || nonce_ptr.is_null() || tag_ptr.is_null() {
        return GCMKIT_ERR_NULL;
    }

    guarded(|| {
        let constants = constants(handle)?;
        let mut state = CipherState::new(constants, input(nonce_ptr, byte_len(nonce_bits)?)?)?;
        let aad = input(aad_ptr, byte_len(aad_bits)?)?;
        let tag = input(tag_ptr, constants.tag_byte_length())?;
        let buffer = staged(ct_ptr, pt_out, byte_len(ct_bits)?)?;
        state.decrypt_in_place(aad, buffer, tag)?;
        Ok(())
    })
}

// =============================================================================
// IPSEC
// =============================================================================

/// ESP encrypt in place. `packet_ptr` holds `text_len` payload bytes followed
/// by the handle's tag length of writable space for the tag.
///
/// # Safety
/// - `handle` must come from `gcmkit_constants_new`
/// - `salt_ptr` must point to 4 bytes, `iv_ptr` to 8 bytes
/// - `aad_ptr` must be valid for `aad_len` (8 or 12) bytes
/// - `packet_ptr` must be valid for `text_len + tag_byte_length` bytes
#[no_mangle]
pub unsafe extern "C" fn gcmkit_encrypt_from_constants_ipsec(
    handle: *const GcmConstants,
    salt_ptr: *const u8,
    iv_ptr: *const u8,
    aad_ptr: *const u8,
    aad_len: usize,
    packet_ptr: *mut u8,
    text_len: usize,
) -> i32 {
    if handle.is_null() || salt_ptr.is_null() || iv_ptr.is_null() || packet_ptr.is_null() {
        return GCMKIT_ERR_NULL;
    }

    guarded(|| {
        let constants = constants(handle)?;
        let (salt, iv) = esp_params(salt_ptr, iv_ptr);
        let aad = input(aad_ptr, aad_len)?;
        let packet = slice::from_raw_parts_mut(packet_ptr, packet_len(constants, text_len)?);
        ipsec::encrypt_from_constants_ipsec(constants, &salt, &iv, aad, packet)?;
        Ok(())
    })
}

/// ESP decrypt in place; `*checksum_out` receives the 64-bit one's-complement
/// sum of the plaintext on success.
///
/// # Safety
/// As `gcmkit_encrypt_from_constants_ipsec`; `checksum_out` must be valid for
/// one `u64` write.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn gcmkit_decrypt_from_constants_ipsec(
    handle: *const GcmConstants,
    salt_ptr: *const u8,
    iv_ptr: *const u8,
    aad_ptr: *const u8,
    aad_len: usize,
    packet_ptr: *mut u8,
    text_len: usize,
    checksum_out: *mut u64,
) -> i32 {
    if handle.is_null()
        || salt_ptr.is_null()
        || iv_ptr.is_null()
        || packet_ptr.is_null()
        || checksum_out.is_null()
    {
        return GCMKIT_ERR_NULL;
    }

    guarded(|| {
        let constants = constants(handle)?;
        let (salt, iv) = esp_params(salt_ptr, iv_ptr);
        let aad = input(aad_ptr, aad_len)?;
        let packet = slice::from_raw_parts_mut(packet_ptr, packet_len(constants, text_len)?);
        let checksum = ipsec::decrypt_from_constants_ipsec(constants, &salt, &iv, aad, packet)?;
        *checksum_out = checksum.value();
        Ok(())
    })
}

unsafe fn esp_params(salt_ptr: *const u8, iv_ptr: *const u8) -> ([u8; SALT_SIZE], [u8; ESP_IV_SIZE]) {
    let mut salt = [0u8; SALT_SIZE];
    let mut iv = [0u8; ESP_IV_SIZE];
    salt.copy_from_slice(slice::from_raw_parts(salt_ptr, SALT_SIZE));
    iv.copy_from_slice(slice::from_raw_parts(iv_ptr, ESP_IV_SIZE));
    (salt, iv)
}

fn packet_len(constants: &CipherConstants, text_len: usize) -> Result<usize, SetupError> {
    text_len
        .checked_add(constants.tag_byte_length())
        .ok_or(SetupError::MessageTooLong)
}

// =============================================================================
// INTROSPECTION
// =============================================================================

/// Get the name of the active backend.
///
/// # Returns
/// A pointer to a static, null-terminated C string (e.g. `"AES-NI + PCLMULQDQ"`).
/// Must NOT be freed by the caller.
#[no_mangle]
pub extern "C" fn gcmkit_get_backend_name() -> *const c_char {
    let name = match crate::engine::dispatcher::best_backend().backend() {
        Backend::Portable => c"Portable",
        Backend::AesNi => c"AES-NI + PCLMULQDQ",
    };
    name.as_ptr()
}
