use std::path::PathBuf;
use structopt::{clap::AppSettings, StructOpt};

/// A codec for the MiniLyrics lyrics search protocol
///
/// Builds search requests and decodes captured replies.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "minilyrics",
    setting(AppSettings::ArgRequiredElseHelp),
    setting(AppSettings::UnifiedHelpMessage)
)]
pub struct Opt {
    /// Optional TOML file with the decoder settings
    #[structopt(short, long, global(true), parse(from_os_str))]
    pub config: Option<PathBuf>,
    #[structopt(subcommand)]
    pub cmd: Command,
}

#[derive(StructOpt, Debug)]
pub enum Command {
    /// Build the encrypted request body for a search
    Query(super::query::Opt),
    /// Decode a captured reply body
    Decode(super::decode::Opt),
    /// Open a captured request body and check its digest
    Inspect(super::inspect::Opt),
}
