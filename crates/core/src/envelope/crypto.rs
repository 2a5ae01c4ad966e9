use log::trace;

/// Derive the single byte XOR key used for a plaintext
///
/// The key is the integer mean of all the bytes truncated to eight bits.
/// There is no key for an empty buffer.
pub fn derive_key(buf: &[u8]) -> Option<u8> {
    if buf.is_empty() {
        return None;
    }
    let sum: u64 = buf.iter().map(|b| *b as u64).sum();
    let key = ((sum / buf.len() as u64) & 0xFF) as u8;
    trace!("Derived key {:#04x} from {} bytes", key, buf.len());
    Some(key)
}

pub fn decrypt(key: u8, buf: &[u8]) -> Vec<u8> {
    buf.iter().map(|byte| byte ^ key).collect()
}

pub fn encrypt(key: u8, buf: &[u8]) -> Vec<u8> {
    // Encrypt is the same as decrypt
    decrypt(key, buf)
}

#[test]
fn test_derive_key() {
    assert_eq!(derive_key(b""), None);
    assert_eq!(derive_key(&[0x10]), Some(0x10));
    // (1 + 2 + 4) / 3 = 2.33
    assert_eq!(derive_key(&[1, 2, 4]), Some(2));
    assert_eq!(derive_key(&[0xFF; 64]), Some(0xFF));
    assert_eq!(derive_key(&[0xFF, 0xFE]), Some(0xFE));
}

#[test]
fn test_derive_key_query_text() {
    let text = b"<searchV1 />";
    let sum: u64 = text.iter().map(|b| *b as u64).sum();
    assert_eq!(derive_key(text), Some((sum / text.len() as u64) as u8));
}

#[test]
fn test_crypto_roundtrip() {
    let zeros: [u8; 256] = [0; 256];

    for key in [0x00, 0x5a, 0xff] {
        let encrypted = encrypt(key, &zeros[..]);
        assert!(encrypted.iter().all(|b| *b == key));
        let decrypted = decrypt(key, &encrypted[..]);
        assert_eq!(decrypted, &zeros[..]);
    }
}
