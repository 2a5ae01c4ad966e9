use std::path::PathBuf;
use structopt::StructOpt;

/// The query command writes the request body for a search
///
/// Either the artist or the title may be left out, but not both.
#[derive(StructOpt, Debug)]
pub struct Opt {
    /// The artist to search for
    #[structopt(short, long, default_value = "")]
    pub artist: String,
    /// The title to search for
    #[structopt(short, long, default_value = "")]
    pub title: String,
    /// Write the raw body to this file instead of printing it as hex
    #[structopt(short, long, parse(from_os_str))]
    pub output: Option<PathBuf>,
}
