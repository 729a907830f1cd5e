use bolero::check;
use gcmkit::{
    decrypt_from_constants_ipsec, encrypt_from_constants_ipsec, encrypt_full, CipherConstants,
    CipherMode,
};

fn rfc1071(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    for pair in data.chunks(2) {
        sum += u32::from(u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]));
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}

#[test]
fn fuzz_esp_packets() {
    check!().with_type::<(Vec<u8>, [u8; 12], bool)>().for_each(|(payload, params, esn)| {
        let tag_len = [8, 12, 16][usize::from(params[0]) % 3];
        let constants = CipherConstants::new(CipherMode::Gcm128, tag_len, &[params[1]; 16]).unwrap();
        let salt = [params[0], params[1], params[2], params[3]];
        let mut iv = [0u8; 8];
        iv.copy_from_slice(&params[4..]);
        let aad: &[u8] = if *esn { &params[..] } else { &params[..8] };

        let mut packet = payload.clone();
        packet.resize(payload.len() + tag_len, 0);
        encrypt_from_constants_ipsec(&constants, &salt, &iv, aad, &mut packet).unwrap();

        // Same bytes as the generic path with nonce = salt || iv.
        let mut nonce = [0u8; 12];
        nonce[..4].copy_from_slice(&salt);
        nonce[4..].copy_from_slice(&iv);
        let (ct, tag) = encrypt_full(CipherMode::Gcm128, &[params[1]; 16], &nonce, aad, payload).unwrap();
        assert_eq!(packet[..payload.len()], ct[..]);
        assert_eq!(packet[payload.len()..], tag.as_bytes()[..tag_len]);

        let sealed_tag = packet[payload.len()..].to_vec();
        let checksum =
            decrypt_from_constants_ipsec(&constants, &salt, &iv, aad, &mut packet).unwrap();
        assert_eq!(packet[..payload.len()], payload[..]);
        assert_eq!(packet[payload.len()..], sealed_tag[..]);
        assert_eq!(checksum.fold(), rfc1071(payload));
    });
}
