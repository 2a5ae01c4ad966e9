#![warn(missing_docs)]
//!
//! # MiniLyrics
//!
//! MiniLyrics is a small tool around the MiniLyrics search protocol codec.
//!
//! It can build the encrypted request body for a search, decode a captured
//! reply into JSON and open a captured request to check its digest. It does
//! not talk to the network itself.
//!
use anyhow::Result;
use env_logger::Env;
use log::*;
use structopt::StructOpt;

mod cmdline;
mod config;
mod decode;
mod inspect;
mod query;

use cmdline::{Command, Opt};
use config::Config;

fn main() -> Result<()> {
    let opt = Opt::from_args();
    let config = Config::load(opt.config.as_deref())?;

    let level = if config.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!(
        "MiniLyrics {} {}",
        env!("MINILYRICS_VERSION"),
        env!("MINILYRICS_PROFILE")
    );

    match opt.cmd {
        Command::Query(opts) => {
            query::main(opts)?;
        }
        Command::Decode(opts) => {
            decode::main(opts, &config)?;
        }
        Command::Inspect(opts) => {
            inspect::main(opts)?;
        }
    }

    Ok(())
}
