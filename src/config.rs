use anyhow::{Context, Result};
use minilyrics_core::mbxml::DecodeOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use validator::Validate;
use validator_derive::Validate;

#[derive(Debug, Deserialize, Validate, Clone, Default)]
pub(crate) struct Config {
    /// Raise the log level to debug
    #[serde(default)]
    pub(crate) debug: bool,

    #[validate]
    #[serde(default)]
    pub(crate) decoder: DecoderConfig,
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub(crate) struct DecoderConfig {
    #[validate(range(min = 1, max = 1024, message = "Invalid max depth", code = "max_depth"))]
    #[serde(default = "default_max_depth")]
    pub(crate) max_depth: usize,

    #[serde(default)]
    pub(crate) strict_lengths: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            strict_lengths: false,
        }
    }
}

fn default_max_depth() -> usize {
    DecodeOptions::default().max_depth
}

impl DecoderConfig {
    pub(crate) fn options(&self) -> DecodeOptions {
        DecodeOptions {
            max_depth: self.max_depth,
            strict_lengths: self.strict_lengths,
        }
    }
}

impl Config {
    /// Read and validate the config, the defaults are used without a file
    pub(crate) fn load(path: Option<&Path>) -> Result<Config> {
        let config = match path {
            Some(path) => Config::parse(
                &fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?,
            )
            .with_context(|| format!("Failed to load the {:?} config file", path))?,
            None => Config::default(),
        };
        Ok(config)
    }

    pub(crate) fn parse(text: &str) -> Result<Config> {
        let config: Config = toml::from_str(text).context("Failed to parse the config")?;
        config
            .validate()
            .context("Failed to validate the config")?;
        Ok(config)
    }
}
