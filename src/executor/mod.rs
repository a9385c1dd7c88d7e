//! A tool for executing commands.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

pub mod ffmpeg;

/// Represents a command executor.
///
/// # Example
///
/// ```rust,no_run
/// # use std::path::PathBuf;
/// # use rutubedl::executor::Executor;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let executor = Executor {
///     executable_path: PathBuf::from("ffmpeg"),
///     timeout: None,
///     args: vec!["-version".to_string()],
/// };
///
/// let output = executor.execute().await?;
/// println!("Output: {}", output.stdout);
///
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Executor {
    /// The path to the command executable.
    pub executable_path: PathBuf,
    /// The timeout for the process, if any.
    pub timeout: Option<Duration>,

    /// The arguments to pass to the command.
    pub args: Vec<String>,
}

/// Represents the output of a process.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    /// The stdout of the process.
    pub stdout: String,
    /// The stderr of the process.
    pub stderr: String,
    /// The exit code of the process.
    pub code: i32,
}

impl Executor {
    /// Executes the command and returns the output.
    ///
    /// # Errors
    ///
    /// This function will return an error if the command could not be executed,
    /// exited with a failure code, or timed out.
    pub async fn execute(&self) -> Result<ProcessOutput> {
        log::debug!("Executing command: {:?}", self);

        let mut command = tokio::process::Command::new(&self.executable_path);
        command.stdin(std::process::Stdio::null());
        command.stdout(std::process::Stdio::piped());
        command.stderr(std::process::Stdio::piped());

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(0x08000000);
        }

        command.args(&self.args);
        let mut child = command.spawn()?;

        // Drain both pipes while waiting so a chatty process can't block on a full buffer.
        let stdout_handle = child
            .stdout
            .take()
            .ok_or_else(|| Error::Command("Failed to capture stdout".to_string()))?;
        let stderr_handle = child
            .stderr
            .take()
            .ok_or_else(|| Error::Command("Failed to capture stderr".to_string()))?;

        let stdout_task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            tokio::io::copy(&mut tokio::io::BufReader::new(stdout_handle), &mut buffer).await?;
            Ok::<Vec<u8>, std::io::Error>(buffer)
        });

        let stderr_task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            tokio::io::copy(&mut tokio::io::BufReader::new(stderr_handle), &mut buffer).await?;
            Ok::<Vec<u8>, std::io::Error>(buffer)
        });

        let exit_status = match self.timeout {
            None => child.wait().await?,
            Some(timeout) => match tokio::time::timeout(timeout, child.wait()).await {
                Ok(result) => result?,
                Err(_) => {
                    log::warn!("Process timed out after {:?}, killing it", timeout);

                    if let Err(e) = child.kill().await {
                        log::error!("Failed to kill process after timeout: {}", e);
                    }

                    return Err(Error::Timeout(timeout));
                }
            },
        };

        let stdout = String::from_utf8_lossy(&stdout_task.await??).into_owned();
        let stderr = String::from_utf8_lossy(&stderr_task.await??).into_owned();

        let code = exit_status.code().unwrap_or(-1);
        if exit_status.success() {
            return Ok(ProcessOutput {
                stdout,
                stderr,
                code,
            });
        }

        Err(Error::Command(format!(
            "Process failed with code {}: {}",
            code,
            stderr.trim()
        )))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str, timeout: Option<Duration>) -> Executor {
        Executor {
            executable_path: PathBuf::from("sh"),
            timeout,
            args: vec!["-c".to_string(), script.to_string()],
        }
    }

    #[tokio::test]
    async fn captures_output_of_successful_process() {
        let output = shell("echo out; echo err >&2", None).execute().await.unwrap();

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.code, 0);
    }

    #[tokio::test]
    async fn failing_process_is_a_command_error() {
        let result = shell("echo broken >&2; exit 3", None).execute().await;

        match result {
            Err(Error::Command(message)) => {
                assert_eq!(message, "Process failed with code 3: broken")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn slow_process_times_out() {
        let timeout = Duration::from_millis(100);

        let result = shell("sleep 5", Some(timeout)).execute().await;

        assert!(matches!(result, Err(Error::Timeout(t)) if t == timeout));
    }

    #[tokio::test]
    async fn missing_executable_is_io_error() {
        let executor = Executor {
            executable_path: PathBuf::from("/nonexistent/rutubedl-tool"),
            timeout: None,
            args: Vec::new(),
        };

        assert!(matches!(executor.execute().await, Err(Error::IO(_))));
    }
}
