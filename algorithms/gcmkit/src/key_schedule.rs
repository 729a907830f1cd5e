//! AES Key Expansion
//!
//! FIPS-197 section 5.2 for 128/192/256-bit keys. The schedule lives in a
//! fixed array sized for AES-256 and is wiped on drop.

use crate::kernels::constants::{MAX_ROUND_KEYS, RCON, SBOX};
use crate::types::{Block, CipherMode, SetupError};
use zeroize::Zeroize;

/// Expanded AES key: `mode.round_key_count()` valid entries.
#[derive(Clone)]
pub struct RoundKeys {
    keys: [Block; MAX_ROUND_KEYS],
    count: usize,
}

impl RoundKeys {
    /// The valid round keys, first to last.
    #[must_use]
    pub fn as_slice(&self) -> &[Block] {
        &self.keys[..self.count]
    }

    /// Number of round keys (rounds + 1).
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        self.count
    }
}

impl Drop for RoundKeys {
    fn drop(&mut self) {
        self.keys.zeroize();
    }
}

fn sub_word(w: [u8; 4]) -> [u8; 4] {
    w.map(|b| SBOX[b as usize])
}

/// Expand `key` for `mode`.
///
/// # Errors
/// `SetupError::KeyLength` if `key.len()` does not match the mode.
pub fn expand(mode: CipherMode, key: &[u8]) -> Result<RoundKeys, SetupError> {
    if key.len() != mode.key_len() {
        return Err(SetupError::KeyLength {
            mode: Some(mode),
            actual: key.len(),
        });
    }

    let nk = mode.key_len() / 4;
    let total = mode.round_key_count() * 4;
    let mut words = [[0u8; 4]; MAX_ROUND_KEYS * 4];

    for (word, chunk) in words.iter_mut().zip(key.chunks_exact(4)) {
        word.copy_from_slice(chunk);
    }

    for i in nk..total {
        let mut temp = words[i - 1];
        if i % nk == 0 {
            temp.rotate_left(1);
            temp = sub_word(temp);
            temp[0] ^= RCON[i / nk - 1];
        } else if nk > 6 && i % nk == 4 {
            temp = sub_word(temp);
        }
        let prev = words[i - nk];
        for (t, p) in temp.iter_mut().zip(prev) {
            *t ^= p;
        }
        words[i] = temp;
    }

    let mut keys = [[0u8; 16]; MAX_ROUND_KEYS];
    for (block, quad) in keys.iter_mut().zip(words.chunks_exact(4)) {
        for (dst, word) in block.chunks_exact_mut(4).zip(quad) {
            dst.copy_from_slice(word);
        }
    }
    words.zeroize();

    Ok(RoundKeys {
        keys,
        count: mode.round_key_count(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::kernels::portable::Portable;
    use crate::kernels::Kernel;

    fn sequential_key(len: usize) -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, b) in key.iter_mut().enumerate().take(len) {
            *b = u8::try_from(i).unwrap_or(0);
        }
        key
    }

    #[test]
    fn fips197_a1_last_round_key() {
        let key = hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap();
        let rk = expand(CipherMode::Gcm128, &key).unwrap();
        assert_eq!(rk.len(), 11);
        assert_eq!(
            hex::encode(rk.as_slice()[10]),
            "d014f9a8c9ee2589e13f0cc8b6630ca6"
        );
    }

    #[test]
    fn fips197_appendix_c_encryptions() {
        let cases = [
            (CipherMode::Gcm128, "69c4e0d86a7b0430d8cdb78070b4c55a"),
            (CipherMode::Gcm192, "dda97ca4864cdfe06eaf70a0ec0d7191"),
            (CipherMode::Gcm256, "8ea2b7ca516745bfeafc49904b496089"),
        ];
        for (mode, expected) in cases {
            let key = sequential_key(mode.key_len());
            let rk = expand(mode, &key[..mode.key_len()]).unwrap();
            let mut block: Block = hex::decode("00112233445566778899aabbccddeeff")
                .unwrap()
                .try_into()
                .unwrap();
            Portable.encrypt_block(rk.as_slice(), &mut block);
            assert_eq!(hex::encode(block), expected, "{mode}");
        }
    }

    #[test]
    fn rejects_mismatched_key() {
        assert_eq!(
            expand(CipherMode::Gcm256, &[0u8; 16]).err(),
            Some(SetupError::KeyLength {
                mode: Some(CipherMode::Gcm256),
                actual: 16
            })
        );
    }
}
