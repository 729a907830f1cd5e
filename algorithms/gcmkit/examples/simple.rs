//! gcmkit Basic Example
//!
//! Minimal usage: `let (ct, tag) = gcmkit::encrypt_full(mode, &key, &nonce, aad, msg)?;`

#![allow(clippy::pedantic, clippy::nursery)]

use gcmkit::CipherMode;

fn main() -> Result<(), gcmkit::Error> {
    let key = [0x42u8; 16];
    let nonce = [0x24u8; 12];
    let data = b"Hello, World!";

    let (ct, tag) = gcmkit::encrypt_full(CipherMode::Gcm128, &key, &nonce, b"", data)?;
    let pt = gcmkit::decrypt_full(CipherMode::Gcm128, &key, &nonce, b"", &ct, tag.as_bytes())?;

    println!("Backend:    {}", gcmkit::active_backend());
    println!("Data:       {:?}", String::from_utf8_lossy(data));
    println!("Ciphertext: {}", hex::encode(&ct));
    println!("Tag:        {}", hex::encode(tag.as_bytes()));
    println!("Decrypted:  {:?}", String::from_utf8_lossy(&pt));
    Ok(())
}
