use bolero::check;
use gcmkit::{decrypt_full, encrypt_full, CipherMode, Error};

const KEY: [u8; 16] = [0x3c; 16];
const NONCE: [u8; 12] = [0x0f; 12];

#[test]
fn fuzz_tamper_detection() {
    check!().with_type::<(Vec<u8>, u16)>().for_each(|(data, flip)| {
        let (aad, msg) = data.split_at(data.len() / 4);
        let (ct, tag) = encrypt_full(CipherMode::Gcm128, &KEY, &NONCE, aad, msg).unwrap();

        // =============================================================================
        // CIPHERTEXT CORRUPTION
        // =============================================================================

        if !ct.is_empty() {
            let mut bad = ct.clone();
            let index = usize::from(*flip) % bad.len();
            bad[index] ^= 1 << (flip % 8);
            assert_eq!(
                decrypt_full(CipherMode::Gcm128, &KEY, &NONCE, aad, &bad, tag.as_bytes()),
                Err(Error::AuthenticationFailure),
                "ciphertext flip at {index}"
            );
        }

        // =============================================================================
        // TAG CORRUPTION
        // =============================================================================

        let mut bad_tag = tag.as_bytes().to_vec();
        bad_tag[usize::from(*flip) % 16] ^= 0x80;
        assert_eq!(
            decrypt_full(CipherMode::Gcm128, &KEY, &NONCE, aad, &ct, &bad_tag),
            Err(Error::AuthenticationFailure)
        );

        // =============================================================================
        // AAD CORRUPTION
        // =============================================================================

        let mut bad_aad = aad.to_vec();
        bad_aad.push(0);
        assert_eq!(
            decrypt_full(CipherMode::Gcm128, &KEY, &NONCE, &bad_aad, &ct, tag.as_bytes()),
            Err(Error::AuthenticationFailure)
        );
    });
}
