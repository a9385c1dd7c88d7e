//! Push notifications through an ntfy server.

use crate::error::Result;
use std::fmt;

/// The public ntfy server.
pub const DEFAULT_NTFY_SERVER: &str = "https://ntfy.sh";

/// The severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    /// The ntfy priority of the level.
    pub fn priority(&self) -> &'static str {
        match self {
            Level::Info => "low",
            Level::Warning => "default",
            Level::Error => "high",
        }
    }

    /// The ntfy tag (rendered as an emoji) of the level.
    pub fn tag(&self) -> &'static str {
        match self {
            Level::Info => "speech_balloon",
            Level::Warning => "warning",
            Level::Error => "x",
        }
    }
}

/// Posts messages to one ntfy topic.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: reqwest::Client,
    topic_url: String,
}

impl fmt::Display for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Notifier({})", self.topic_url)
    }
}

impl Notifier {
    /// Creates a notifier without checking the topic.
    pub fn new(server: &str, topic: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            topic_url: topic_url(server, topic),
        }
    }

    /// Creates a notifier after posting a test message to the topic.
    ///
    /// Returns `None`, and logs why, when the server refuses the message or can't be reached.
    pub async fn connect(server: &str, topic: &str) -> Option<Self> {
        let notifier = Self::new(server, topic);
        let test = notifier
            .client
            .post(&notifier.topic_url)
            .header("Title", "ntfy.sh topic test")
            .header("Priority", "min")
            .header("Tags", Level::Info.tag())
            .body("This is a test message to check if provided ntfy.sh topic is correct.")
            .send()
            .await;

        match test {
            Ok(response) if response.status().is_success() => {
                log::debug!("ntfy.sh topic is ok");
                Some(notifier)
            }
            Ok(response) => {
                log::error!(
                    "ntfy.sh topic is NOT ok (status {})! notifications disabled",
                    response.status()
                );
                None
            }
            Err(e) => {
                log::error!("ntfy.sh is unreachable: {}! notifications disabled", e);
                None
            }
        }
    }

    /// Posts a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with a failure status.
    pub async fn post(&self, level: Level, title: &str, text: &str) -> Result<()> {
        self.client
            .post(&self.topic_url)
            .header("Title", title)
            .header("Priority", level.priority())
            .header("Tags", level.tag())
            .body(text.to_string())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Posts a message, logging instead of returning a failure.
    pub async fn notify(&self, level: Level, title: &str, text: &str) {
        if let Err(e) = self.post(level, title, text).await {
            log::warn!("Failed to send notification: {}", e);
        }
    }
}

fn topic_url(server: &str, topic: &str) -> String {
    format!("{}/{}", server.trim_end_matches('/'), topic)
}
