///
/// # MiniLyrics Query
///
/// This module handles the query subcommand
///
/// The subcommand builds the encrypted body that is POSTed to the search
/// service.
///
/// # Usage
///
/// ```bash
/// minilyrics query --artist Queen --title "Bohemian Rhapsody" --output body.bin
/// curl -A MiniLyrics --data-binary @body.bin http://search.crintsoft.com/searchlyrics.htm -o reply.bin
/// ```
///
use anyhow::{Context, Result};
use hex_string::HexString;
use log::*;
use minilyrics_core::envelope::SearchQuery;
use minilyrics_core::search::{SEARCH_HOST, SEARCH_PATH, USER_AGENT};
use std::fs;

mod cmdline;

pub(crate) use cmdline::Opt;

/// Entry point for the query subcommand
///
/// Opt is the command line options
pub(crate) fn main(opt: Opt) -> Result<()> {
    let query = SearchQuery::new(opt.artist, opt.title)
        .context("Give at least one of --artist or --title")?;
    let envelope = query.to_envelope()?;
    let body = envelope.serialize(vec![])?;

    debug!("Document: {}", query.document());
    info!(
        "Key {:#04x}, digest {:x}",
        envelope.key,
        md5::Digest(envelope.digest)
    );
    info!(
        "POST {} bytes to http://{}{} with User-Agent: {}",
        body.len(),
        SEARCH_HOST,
        SEARCH_PATH,
        USER_AGENT
    );

    match opt.output {
        Some(path) => {
            fs::write(&path, &body).with_context(|| format!("Failed to write {:?}", path))?;
            info!("Wrote request body to {:?}", path);
        }
        None => println!("{}", HexString::from_bytes(&body).as_string()),
    }

    Ok(())
}
