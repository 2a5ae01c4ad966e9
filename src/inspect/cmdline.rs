use std::path::PathBuf;
use structopt::StructOpt;

/// The inspect command opens a captured request body
#[derive(StructOpt, Debug)]
pub struct Opt {
    /// The path to the raw request body, envelope included
    #[structopt(parse(from_os_str))]
    pub file: PathBuf,
}
