//! Build configuration
use crate::error::CliResult;
use serde::Deserialize;
use std::{fs, io, path::Path};

/// Name of the optional config file, looked up in the input directory.
pub const CONF_FILENAME: &str = "jackc.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildConf {
    /// Output directory, relative to the input directory.
    pub output_dir: String,
    /// File extension of the generated files.
    pub extension: String,
}

impl Default for BuildConf {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            extension: "vm".to_string(),
        }
    }
}

impl BuildConf {
    /// Load the config file from the given directory, falling back
    /// to the defaults when there is none.
    pub fn load(dir: &Path) -> CliResult<Self> {
        let filepath = dir.join(CONF_FILENAME);
        let text = match fs::read_to_string(&filepath) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };

        let conf = Self::parse(&text)?;
        log::debug!("loaded build configuration from {}: {:?}", filepath.display(), conf);

        Ok(conf)
    }

    /// An empty document yields the defaults.
    pub fn parse(text: &str) -> CliResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}
