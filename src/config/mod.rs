mod input;

use std::fs;
use std::io;

use anyhow::{Context, Result};
use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use relative_images::Options;
use serde::Deserialize;

/// Name of the configuration file looked up at the site root.
pub const FILE_NAME: &str = "relimg.toml";

/// Configuration of which documents to process and how.
#[derive(Debug, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Directories holding the Markdown documents.
    ///
    /// Either absolute paths or relative to the site root.
    #[serde(default = "default_content", deserialize_with = "input::deserialize")]
    pub content: Vec<PathBuf>,

    /// How references are resolved and rewritten
    #[serde(default, rename = "rewrite")]
    pub options: Options,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content: default_content(),
            options: Options::default(),
        }
    }
}

fn default_content() -> Vec<PathBuf> {
    vec![PathBuf::from("content")]
}

pub fn load(root: &Path) -> Result<Config> {
    let path = root.join(FILE_NAME);

    let mut config = {
        let ctx = || format!("failed to load config from `{}`", path);
        load_from_path(&path).with_context(ctx)?
    };

    // Normalize all the paths
    for dir in &mut config.content {
        *dir = root.join(&dir);
    }

    Ok(config)
}

fn load_from_path(path: &Path) -> Result<Config> {
    let config = match fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).context("failed to deserialize config")?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => Config::default(),
        Err(err) => return Err(err).context("failed to read config file")?,
    };
    Ok(config)
}
