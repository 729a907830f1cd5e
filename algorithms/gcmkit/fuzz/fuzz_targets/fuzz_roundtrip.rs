#![no_main]

use gcmkit::{decrypt_full, encrypt_full, CipherMode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // =============================================================================
    // PREPARATION
    // =============================================================================

    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let mode = match selector % 3 {
        0 => CipherMode::Gcm128,
        1 => CipherMode::Gcm192,
        _ => CipherMode::Gcm256,
    };
    let key_len = mode.key_len();
    if rest.len() < key_len + 1 {
        return;
    }
    let (key, rest) = rest.split_at(key_len);

    // Nonce length 1..=64 covers both J0 derivations.
    let nonce_len = (1 + usize::from(selector >> 2)).min(rest.len());
    let (nonce, rest) = rest.split_at(nonce_len);
    let (aad, msg) = rest.split_at(rest.len() / 3);

    // =============================================================================
    // ROUND TRIP
    // =============================================================================

    let (ct, tag) = encrypt_full(mode, key, nonce, aad, msg).expect("valid parameters");
    assert_eq!(ct.len(), msg.len());

    let pt = decrypt_full(mode, key, nonce, aad, &ct, tag.as_bytes()).expect("authentic message");
    assert_eq!(pt, msg, "round trip mismatch");

    // Truncated tags remain valid prefixes.
    let short = decrypt_full(mode, key, nonce, aad, &ct, &tag.as_bytes()[..12]);
    assert!(short.is_ok(), "12-byte tag prefix rejected");
});
