#![no_main]

use gcmkit::{decrypt_full, encrypt_full, CipherMode, Error};
use libfuzzer_sys::fuzz_target;

const KEY: [u8; 32] = [0xA7; 32];
const NONCE: [u8; 12] = [0x19; 12];

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let (flip, body) = data.split_at(2);
    let (aad, msg) = body.split_at(body.len() / 4);
    let (ct, tag) = encrypt_full(CipherMode::Gcm256, &KEY, &NONCE, aad, msg).expect("sealed");

    // =============================================================================
    // CORRUPTED CIPHERTEXT OR TAG
    // =============================================================================

    let total = ct.len() + 16;
    let position = usize::from(u16::from_le_bytes([flip[0], flip[1]])) % total;
    let mut bad_ct = ct.clone();
    let mut bad_tag = tag.as_bytes().to_vec();
    if position < ct.len() {
        bad_ct[position] ^= 0x01;
    } else {
        bad_tag[position - ct.len()] ^= 0x01;
    }

    assert_eq!(
        decrypt_full(CipherMode::Gcm256, &KEY, &NONCE, aad, &bad_ct, &bad_tag),
        Err(Error::AuthenticationFailure),
        "tamper at {position} accepted"
    );
});
