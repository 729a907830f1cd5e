#![no_main]

use gcmkit::{decrypt_from_constants_ipsec, encrypt_from_constants_ipsec, CipherConstants, CipherMode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 28 {
        return;
    }
    let (params, payload) = data.split_at(28);
    let tag_len = [8, 12, 16][usize::from(params[0]) % 3];
    let constants =
        CipherConstants::new(CipherMode::Gcm128, tag_len, &params[..16]).expect("valid key");

    let mut salt = [0u8; 4];
    let mut iv = [0u8; 8];
    salt.copy_from_slice(&params[16..20]);
    iv.copy_from_slice(&params[20..28]);
    let aad = if params[1] & 1 == 0 { &params[..8] } else { &params[..12] };

    // =============================================================================
    // ENCRYPT / DECRYPT
    // =============================================================================

    let mut packet = payload.to_vec();
    packet.resize(payload.len() + tag_len, 0);
    encrypt_from_constants_ipsec(&constants, &salt, &iv, aad, &mut packet).expect("encrypt");
    let sealed_tag = packet[payload.len()..].to_vec();

    let checksum =
        decrypt_from_constants_ipsec(&constants, &salt, &iv, aad, &mut packet).expect("decrypt");
    assert_eq!(&packet[..payload.len()], payload);
    assert_eq!(packet[payload.len()..], sealed_tag[..], "tag slot clobbered");

    let mut expected = gcmkit::Checksum::new();
    expected.update(payload);
    assert_eq!(checksum, expected);
});
