use super::model::*;
use super::Error;
use cookie_factory::bytes::*;
use cookie_factory::sequence::tuple;
use cookie_factory::{combinator::*, gen};
use cookie_factory::SerializeFn;
use std::io::Write;

impl Envelope {
    /// Write the envelope prefix followed by the encrypted body
    pub fn serialize<W: Write>(&self, buf: W) -> Result<W, Error> {
        let (buf, _n) = gen(envelope(self), buf)?;
        Ok(buf)
    }
}

fn envelope<'a, W: Write + 'a>(envelope: &'a Envelope) -> impl SerializeFn<W> + 'a {
    tuple((
        be_u8(envelope.marker),
        be_u8(envelope.key),
        slice(envelope.reserved),
        slice(envelope.digest),
        slice(&envelope.body),
    ))
}

#[test]
fn test_envelope_ser() {
    let envelope = Envelope {
        marker: 0x02,
        key: 0x5a,
        reserved: [0x04, 0x00, 0x00, 0x00],
        digest: [0x11; 16],
        body: vec![0x01, 0x02, 0x03],
    };

    let buf = envelope.serialize(vec![]).unwrap();
    assert_eq!(buf.len(), HEADER_LEN + 3);
    assert_eq!(&buf[..6], &[0x02, 0x5a, 0x04, 0x00, 0x00, 0x00]);
    assert_eq!(&buf[6..22], &[0x11; 16]);
    assert_eq!(&buf[22..], &[0x01, 0x02, 0x03]);

    assert_eq!(Envelope::deserialize(&buf).unwrap(), envelope);
}
