use std::path::PathBuf;
use structopt::StructOpt;

/// The decode command turns a captured reply body into JSON
#[derive(StructOpt, Debug)]
pub struct Opt {
    /// The path to the raw reply body, envelope included
    #[structopt(parse(from_os_str))]
    pub file: PathBuf,
    /// Print the untyped element tree instead of the search response
    #[structopt(long)]
    pub tree: bool,
}
