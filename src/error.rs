//! The errors that can occur.

use std::time::Duration;
use thiserror::Error;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// The possible errors that can occur.
#[derive(Debug, Error)]
pub enum Error {
    /// The metadata API answered 404: the identifier does not name a known video.
    #[error("Invalid link!")]
    InvalidLink,
    /// The metadata API answered with an unexpected status.
    #[error("Can't reach rutube API! Status code: {0}")]
    Upstream(u16),
    /// The master playlist could not be fetched.
    #[error("Can't get available streams! Status code: {0}")]
    ManifestFetch(u16),
    /// A stream declaration lacked a required attribute.
    #[error("Malformed stream declaration: missing {0}")]
    MalformedManifest(String),
    /// The external media tool exited abnormally.
    #[error("ffmpeg error occurred: {0}")]
    ExternalTool(String),
    /// The selected variant index is outside the variant list.
    #[error("No variant at index {index} (only {len} available)")]
    VariantIndex { index: usize, len: usize },
    /// A metadata field required by the operation is absent.
    #[error("Field '{0}' is missing from the video metadata")]
    MissingField(&'static str),
    /// The thumbnail could not be fetched.
    #[error("Can't get thumbnail! Status code: {0}")]
    Thumbnail(u16),

    /// An error occurred while sending a request.
    #[error("An error occurred while fetching: {0}")]
    Transport(#[from] reqwest::Error),
    /// An error occurred while interacting with the file system.
    #[error("An IO error occurred: {0}")]
    IO(#[from] std::io::Error),
    /// An error occurred while parsing JSON.
    #[error("An error occurred while parsing JSON: {0}")]
    Serde(#[from] serde_json::Error),
    /// An error occurred while parsing the configuration file.
    #[error("Malformed config file: {0}")]
    Config(#[from] toml::de::Error),
    /// An error occurred while running the runtime.
    #[error("An error occurred while running the runtime: {0}")]
    Runtime(#[from] tokio::task::JoinError),
    /// An error occurred while running a command.
    #[error("Failed to execute command: {0}")]
    Command(String),
    /// An error occurred due to a timeout.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// The process exit code the command line reports for this error.
    ///
    /// Failures of the media tool exit with `2`, everything else with `1`.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::ExternalTool(_) => 2,
            _ => 1,
        }
    }
}
