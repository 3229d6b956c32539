use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE_NAME: &str = ".wftools";

/// Settings read from `~/.wftools`.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(rename = "CROMWELL_SERVER", skip_serializing_if = "Option::is_none")]
    pub cromwell_server: Option<String>,
    #[serde(rename = "TES_SERVER", skip_serializing_if = "Option::is_none")]
    pub tes_server: Option<String>,
    #[serde(rename = "WES_SERVER", skip_serializing_if = "Option::is_none")]
    pub wes_server: Option<String>,
    #[serde(rename = "DEBUG", skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to determine home directory; pass --host or set the server environment variable")]
    NoHome,

    #[error("Expected {} to be a TOML file, but found a directory", path.display())]
    IsDirectory { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {} as TOML: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::var_os("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home).join(CONFIG_FILE_NAME));
        }
    }

    if cfg!(windows) {
        if let Some(profile) = env::var_os("USERPROFILE") {
            if !profile.is_empty() {
                return Ok(PathBuf::from(profile).join(CONFIG_FILE_NAME));
            }
        }
    }

    Err(ConfigError::NoHome)
}

/// Read the config at `path`. A missing file is an empty config.
pub fn load_config(path: &Path) -> Result<CliConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => toml::from_str::<CliConfig>(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(CliConfig::default()),
        Err(_) if path.is_dir() => Err(ConfigError::IsDirectory {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
