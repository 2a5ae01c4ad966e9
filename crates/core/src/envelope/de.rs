use super::model::*;
use super::Error;
use log::*;
use nom::{bytes::complete::take, combinator::*, number::complete::le_u8};
use std::convert::TryFrom;

type IResult<I, O, E = nom::error::Error<I>> = Result<(I, O), nom::Err<E>>;

impl Envelope {
    /// Split raw bytes into the envelope fields
    ///
    /// The bytes must already be complete, framing is the job of the transport.
    pub fn deserialize(buf: &[u8]) -> Result<Envelope, Error> {
        if buf.len() < HEADER_LEN {
            return Err(Error::TruncatedResponse { len: buf.len() });
        }
        let (_, envelope) =
            envelope(buf).map_err(|_| Error::TruncatedResponse { len: buf.len() })?;

        if envelope.marker != ENVELOPE_MARKER {
            warn!("Unexpected envelope marker {:#04x}", envelope.marker);
        }
        if envelope.reserved != RESERVED {
            warn!("Unexpected reserved envelope bytes {:02x?}", envelope.reserved);
        }
        trace!(
            "Envelope key {:#04x} with {} body bytes",
            envelope.key,
            envelope.body.len()
        );

        Ok(envelope)
    }
}

/// Recover the compressed tree stream from a raw response body
pub fn decrypt_response(buf: &[u8]) -> Result<Vec<u8>, Error> {
    Ok(Envelope::deserialize(buf)?.decrypted_body())
}

fn envelope(buf: &[u8]) -> IResult<&[u8], Envelope> {
    let (buf, marker) = le_u8(buf)?;
    let (buf, key) = le_u8(buf)?;
    let (buf, reserved) = map_res(take(4usize), |s: &[u8]| <[u8; 4]>::try_from(s))(buf)?;
    let (buf, digest) = map_res(take(16usize), |s: &[u8]| <[u8; 16]>::try_from(s))(buf)?;
    let (buf, body) = rest(buf)?;

    Ok((
        buf,
        Envelope {
            marker,
            key,
            reserved,
            digest,
            body: body.to_vec(),
        },
    ))
}
