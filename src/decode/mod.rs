///
/// # MiniLyrics Decode
///
/// This module handles the decode subcommand
///
/// The subcommand decrypts a captured reply, decodes the MBXML1 tree and
/// prints it as JSON, either as the typed search response or as the raw tree.
///
/// # Usage
///
/// ```bash
/// minilyrics decode reply.bin
/// minilyrics --config=minilyrics.toml decode --tree reply.bin
/// ```
///
use anyhow::{Context, Result};
use log::*;
use minilyrics_core::mbxml::DecodeOptions;
use minilyrics_core::search;
use std::fs;

mod cmdline;

use super::config::Config;
pub(crate) use cmdline::Opt;

/// Entry point for the decode subcommand
///
/// Opt is the command line options
pub(crate) fn main(opt: Opt, config: &Config) -> Result<()> {
    let buf = fs::read(&opt.file).with_context(|| format!("Failed to read {:?}", opt.file))?;
    let json = render(&buf, &config.decoder.options(), opt.tree)
        .with_context(|| format!("Failed to decode {:?}", opt.file))?;
    println!("{}", json);
    Ok(())
}

fn render(buf: &[u8], options: &DecodeOptions, tree: bool) -> Result<String> {
    let root = search::decode_response_with(buf, options)?;
    if tree {
        return Ok(serde_json::to_string_pretty(&root)?);
    }

    let response = search::map_result(&root)?;
    if !response.is_ok() {
        warn!("Search returned {}", response.result.as_str());
    }
    for (item, url) in response.items().iter().zip(response.lyrics_urls()) {
        info!(
            "{} - {}: {}",
            item.artist.as_deref().unwrap_or("?"),
            item.title.as_deref().unwrap_or("?"),
            url
        );
    }
    Ok(serde_json::to_string_pretty(&response)?)
}
