///
/// # MiniLyrics Inspect
///
/// This module handles the inspect subcommand
///
/// The subcommand decrypts a captured request, prints the query document and
/// reports whether the embedded digest matches it.
///
/// # Usage
///
/// ```bash
/// minilyrics inspect body.bin
/// ```
///
use anyhow::{Context, Result};
use log::*;
use minilyrics_core::envelope::{derive_key, Envelope};
use std::fs;

mod cmdline;

pub(crate) use cmdline::Opt;

/// Entry point for the inspect subcommand
///
/// Opt is the command line options
pub(crate) fn main(opt: Opt) -> Result<()> {
    let buf = fs::read(&opt.file).with_context(|| format!("Failed to read {:?}", opt.file))?;
    let (document, digest_ok) = inspect(&buf)?;
    println!("{}", document);
    if digest_ok {
        info!("Digest matches the document");
    } else {
        warn!("Digest does not match the document");
    }
    Ok(())
}

fn inspect(buf: &[u8]) -> Result<(String, bool)> {
    let envelope = Envelope::deserialize(buf)?;
    let plaintext = envelope.decrypted_body();

    debug!(
        "Key {:#04x}, digest {:x}",
        envelope.key,
        md5::Digest(envelope.digest)
    );
    if derive_key(&plaintext) != Some(envelope.key) {
        warn!("Key is not the mean of the plaintext, this may not be a request");
    }

    let document = String::from_utf8_lossy(&plaintext).into_owned();
    Ok((document, envelope.verify_query_digest()))
}
