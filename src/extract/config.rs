use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Where inside-node locations are kept during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NodeCache {
    #[default]
    Memory,
    Disk,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub node_cache: NodeCache,
    pub batch_size: usize,
    /// Parent directory for the disk node cache
    pub tmp_dir: Option<PathBuf>,
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_cache: NodeCache::Memory,
            batch_size: 65_536,
            tmp_dir: None,
            progress: true,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
