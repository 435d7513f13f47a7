//! # Configuration File
//!
//! Optional YAML file given with `--config`. Every key is optional:
//!
//! ```yaml
//! schema: true            # same as -s
//! quiet: false            # same as -q
//! remote_imports: reject  # same as --no-remote-imports
//! ```
//!
//! Command-line flags can only switch options on over the file values.

use std::path::{Path, PathBuf};

use biocheck_schema::RemoteImports;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Settings read from a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub schema: bool,
    pub quiet: bool,
    pub remote_imports: RemoteImports,
}

impl CliConfig {
    /// Load a configuration file. An empty file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
