use super::crypto;

pub(super) const ENVELOPE_MARKER: u8 = 0x02;
pub(super) const RESERVED: [u8; 4] = [0x04, 0x00, 0x00, 0x00];

/// Size of the envelope prefix: marker, key, reserved bytes and digest
pub const HEADER_LEN: usize = 22;

/// Appended to the query text before it is hashed
pub(super) const DIGEST_SALT: &[u8] = b"Mlv1clt4.0";

/// The envelope wrapped around both requests and responses
///
/// The body is kept in its encrypted form, use [`Envelope::decrypted_body`]
/// to recover the plaintext.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Envelope {
    /// Always 0x02 on the wire
    pub marker: u8,
    /// The XOR key applied to every body byte
    pub key: u8,
    /// Always 0x04 0x00 0x00 0x00 on the wire
    pub reserved: [u8; 4],
    /// MD5 digest of the query text and salt. Not meaningful for responses
    pub digest: [u8; 16],
    /// The encrypted body
    pub body: Vec<u8>,
}

impl Envelope {
    /// Encrypt `plaintext` with `key` and wrap it together with `digest`
    pub fn seal(key: u8, digest: [u8; 16], plaintext: &[u8]) -> Envelope {
        Envelope {
            marker: ENVELOPE_MARKER,
            key,
            reserved: RESERVED,
            digest,
            body: crypto::encrypt(key, plaintext),
        }
    }

    /// Reverse the XOR cipher on the body
    pub fn decrypted_body(&self) -> Vec<u8> {
        crypto::decrypt(self.key, &self.body)
    }

    /// Check the digest against the decrypted body as if this were a query
    ///
    /// Only requests carry a digest of their own content. The service does not
    /// document what the response digest covers so it is never checked.
    pub fn verify_query_digest(&self) -> bool {
        query_digest(&self.decrypted_body()) == self.digest
    }
}

pub(super) fn query_digest(text: &[u8]) -> [u8; 16] {
    let mut context = md5::Context::new();
    context.consume(text);
    context.consume(DIGEST_SALT);
    context.compute().0
}

#[test]
fn test_query_digest() {
    // md5("Mlv1clt4.0") with an empty query text
    let expected = md5::compute(b"Mlv1clt4.0").0;
    assert_eq!(query_digest(b""), expected);

    let expected = md5::compute(b"helloMlv1clt4.0").0;
    assert_eq!(query_digest(b"hello"), expected);
}

#[test]
fn test_seal_and_verify() {
    let text = b"<searchV1 artist=\"a\" />";
    let envelope = Envelope::seal(0x3c, query_digest(text), text);

    assert_eq!(envelope.marker, ENVELOPE_MARKER);
    assert_eq!(envelope.reserved, RESERVED);
    assert_ne!(&envelope.body[..], &text[..]);
    assert_eq!(envelope.decrypted_body(), &text[..]);
    assert!(envelope.verify_query_digest());

    let tampered = Envelope {
        key: 0x3d,
        ..envelope
    };
    assert!(!tampered.verify_query_digest());
}
