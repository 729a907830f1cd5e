use bolero::check;
use gcmkit::{decrypt_full, encrypt_full, CipherConstants, CipherMode, CipherState, GcmConfig};

/// Split fuzz input into key, nonce, AAD and plaintext.
fn split(data: &[u8]) -> (CipherMode, Vec<u8>, Vec<u8>, &[u8], &[u8]) {
    let selector = data.first().copied().unwrap_or(0);
    let mode = match selector % 3 {
        0 => CipherMode::Gcm128,
        1 => CipherMode::Gcm192,
        _ => CipherMode::Gcm256,
    };
    let key: Vec<u8> = (0..mode.key_len()).map(|i| selector ^ i as u8).collect();
    // Nonce length 1..=32 exercises both J0 derivations.
    let nonce_len = 1 + usize::from(selector >> 3) % 32;
    let nonce: Vec<u8> = (0..nonce_len).map(|i| selector.wrapping_add(i as u8)).collect();

    let rest = data.get(1..).unwrap_or(&[]);
    let aad_len = rest.len().min(usize::from(selector) % 40);
    let (aad, text) = rest.split_at(aad_len);
    (mode, key, nonce, aad, text)
}

#[test]
fn fuzz_round_trip() {
    check!().with_type::<Vec<u8>>().for_each(|data| {
        let (mode, key, nonce, aad, text) = split(data);

        let (ct, tag) = encrypt_full(mode, &key, &nonce, aad, text).unwrap();
        assert_eq!(ct.len(), text.len());

        let pt = decrypt_full(mode, &key, &nonce, aad, &ct, tag.as_bytes()).unwrap();
        assert_eq!(pt, text, "round trip failed for {mode}");
    });
}

#[test]
fn fuzz_state_paths_agree() {
    check!().with_type::<Vec<u8>>().for_each(|data| {
        let (mode, key, nonce, aad, text) = split(data);
        let (expected_ct, expected_tag) = encrypt_full(mode, &key, &nonce, aad, text).unwrap();

        // Portable backend, batch size from the input.
        let batch = 1 + usize::from(data.last().copied().unwrap_or(0)) % 8;
        let config = GcmConfig::new()
            .with_hash_batch(batch)
            .with_backend(gcmkit::Backend::Portable);
        let constants = CipherConstants::with_config(mode, &key, &config).unwrap();
        let mut state = CipherState::new(&constants, &nonce).unwrap();

        let mut out = vec![0u8; text.len()];
        let mut tag = [0u8; 16];
        state.encrypt(aad, text, &mut out, &mut tag).unwrap();
        assert_eq!(out, expected_ct, "batch {batch}");
        assert_eq!(tag.as_slice(), expected_tag.as_bytes(), "batch {batch}");

        state.reset();
        let mut back = vec![0u8; out.len()];
        state.decrypt(aad, &out, &tag, &mut back).unwrap();
        assert_eq!(back, text);
    });
}
