//! User configuration, read from `config.toml` in the platform config directory.

use crate::error::Result;
use crate::fetcher::DEFAULT_USER_AGENT;
use crate::fetcher::metadata::DEFAULT_API_BASE;
use crate::notify::DEFAULT_NTFY_SERVER;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings shared by the library and the command line.
///
/// Every field is optional in the file; missing ones take their default.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the play-options API.
    pub api_base: String,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Path to the ffmpeg executable.
    pub ffmpeg: PathBuf,
    /// Directory where videos are saved.
    pub output_dir: PathBuf,
    /// Seconds after which ffmpeg is killed; unlimited when absent.
    pub timeout_secs: Option<u64>,
    /// The ntfy server notifications go to.
    pub ntfy_server: String,
    /// The ntfy topic; notifications are off when absent.
    pub ntfy_topic: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            ffmpeg: PathBuf::from("ffmpeg"),
            output_dir: PathBuf::from("."),
            timeout_secs: None,
            ntfy_server: DEFAULT_NTFY_SERVER.to_string(),
            ntfy_topic: None,
        }
    }
}

impl Config {
    /// The default location, `<config dir>/RutubeDL/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("RutubeDL").join("config.toml"))
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Config`] if the text is not a valid configuration.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reads the configuration at `path`, or the defaults if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Reads the configuration from the default location.
    ///
    /// A malformed file is reported and the defaults are used instead.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{} ({})", e, path.display());
                Self::default()
            }
        }
    }

    /// The ffmpeg timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
