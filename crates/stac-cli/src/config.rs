use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use stac_types::DEFAULT_STAC_VERSION;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "stac.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Write indented JSON.
    pub pretty_json: bool,
    /// Version applied by `render --upgrade`.
    pub stac_version: String,
    /// Local schema directory, laid out as `v<version>/<kind>.json`.
    pub schema_dir: Option<PathBuf>,
    /// Fallback schema location used when `schema_dir` misses. Any href the
    /// filesystem store can read, laid out like `schema_dir`.
    pub schema_mirror: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            pretty_json: true,
            stac_version: DEFAULT_STAC_VERSION.to_string(),
            schema_dir: None,
            schema_mirror: None,
        }
    }
}

impl CliConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load `path`, or `./stac.toml` when no path is given and it exists,
    /// or the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None if Path::new(CONFIG_FILE).exists() => PathBuf::from(CONFIG_FILE),
            None => return Ok(Self::default()),
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
