//! Remuxing streams into local files with ffmpeg.

use crate::error::{Error, Result};
use crate::executor::Executor;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Copies a remote stream into a local container without re-encoding.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Writes the stream at `source` to `destination`, overwriting any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExternalTool`] if the tool fails.
    async fn remux(&self, source: &str, destination: &Path) -> Result<()>;
}

/// The [`MediaTool`] backed by an ffmpeg executable.
#[derive(Debug, Clone, PartialEq)]
pub struct Ffmpeg {
    /// The path to the ffmpeg executable.
    pub executable_path: PathBuf,
    /// The timeout for a single remux, if any.
    pub timeout: Option<Duration>,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Ffmpeg {
    /// Creates a tool running the given executable without timeout.
    pub fn new(executable_path: impl Into<PathBuf>) -> Self {
        Self {
            executable_path: executable_path.into(),
            timeout: None,
        }
    }

    /// Sets the timeout for a single remux.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The arguments of a stream copy from `source` to `destination`.
    ///
    /// All codecs are copied, only errors are printed and the destination is overwritten.
    pub fn stream_copy_args(source: &str, destination: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            source.to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-y".to_string(),
            destination.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl MediaTool for Ffmpeg {
    async fn remux(&self, source: &str, destination: &Path) -> Result<()> {
        let executor = Executor {
            executable_path: self.executable_path.clone(),
            timeout: self.timeout,
            args: Self::stream_copy_args(source, destination),
        };

        match executor.execute().await {
            Ok(_) => Ok(()),
            Err(e) => Err(Error::ExternalTool(e.to_string())),
        }
    }
}
