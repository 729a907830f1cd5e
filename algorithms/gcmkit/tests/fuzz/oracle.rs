use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, Nonce};
use bolero::check;
use gcmkit::{encrypt_full, CipherMode};

type Aes192Gcm = AesGcm<Aes192, U12>;

/// Reference ciphertext || tag from the RustCrypto implementation.
fn reference(mode: CipherMode, key: &[u8], nonce: &[u8; 12], aad: &[u8], msg: &[u8]) -> Vec<u8> {
    let nonce = Nonce::from_slice(nonce);
    let payload = Payload { msg, aad };
    let sealed = match mode {
        CipherMode::Gcm128 => Aes128Gcm::new_from_slice(key).unwrap().encrypt(nonce, payload),
        CipherMode::Gcm192 => Aes192Gcm::new_from_slice(key).unwrap().encrypt(nonce, payload),
        CipherMode::Gcm256 => Aes256Gcm::new_from_slice(key).unwrap().encrypt(nonce, payload),
    };
    sealed.unwrap()
}

#[test]
fn fuzz_matches_reference_implementation() {
    check!().with_type::<Vec<u8>>().for_each(|data| {
        for mode in [CipherMode::Gcm128, CipherMode::Gcm192, CipherMode::Gcm256] {
            let key: Vec<u8> = data.iter().copied().cycle().take(mode.key_len()).collect();
            let key = if key.len() == mode.key_len() {
                key
            } else {
                vec![0u8; mode.key_len()]
            };
            let mut nonce = [0u8; 12];
            for (slot, byte) in nonce.iter_mut().zip(data.iter().rev()) {
                *slot = *byte;
            }
            let split = data.len() / 3;
            let (aad, msg) = data.split_at(split);

            let (ct, tag) = encrypt_full(mode, &key, &nonce, aad, msg).unwrap();
            let mut ours = ct;
            ours.extend_from_slice(tag.as_bytes());

            assert_eq!(ours, reference(mode, &key, &nonce, aad, msg), "{mode}");
        }
    });
}
