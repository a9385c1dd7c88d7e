#![doc = include_str!("../README.md")]

use crate::config::Config;
use crate::error::{Error, Result};
use crate::executor::ffmpeg::{Ffmpeg, MediaTool};
use crate::fetcher::{HttpFetcher, Transport, manifest, metadata, thumbnail};
use crate::model::{SelectionPolicy, StreamVariant, VideoInfo, field};
use crate::notify::{Level, Notifier};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod config;
pub mod error;
pub mod executor;
pub mod fetcher;
pub mod identifier;
pub mod model;
pub mod notify;

pub use identifier::resolve_identifier;

/// A rutube video downloader.
///
/// Resolves a page URL to its play-options metadata, lists the variants of the
/// HLS master playlist, and stream-copies one of them to `<title>.mp4` with ffmpeg.
///
/// # Examples
///
/// ```rust,no_run
/// # use rutubedl::Rutube;
/// # use rutubedl::model::SelectionPolicy;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let rutube = Rutube::new("output");
///
/// let path = rutube
///     .download("https://rutube.ru/video/abcdef123/", SelectionPolicy::Best)
///     .await?;
/// println!("Saved video in '{}'", path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Rutube {
    /// The transport used for the metadata, playlist and thumbnail requests.
    pub transport: Arc<dyn Transport>,
    /// The tool writing the selected stream to disk.
    pub media_tool: Arc<dyn MediaTool>,
    /// Where downloads are reported, if anywhere.
    pub notifier: Option<Notifier>,

    /// The directory where videos are saved.
    pub output_dir: PathBuf,
    /// The base URL of the play-options API.
    pub api_base: String,
    /// The user agent sent with every request.
    pub user_agent: String,
}

impl fmt::Display for Rutube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rutube: output_dir={:?}, api_base={}",
            self.output_dir, self.api_base
        )
    }
}

impl Rutube {
    /// Creates a downloader with default settings, saving into `output_dir`.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        let config = Config {
            output_dir: output_dir.as_ref().to_path_buf(),
            ..Config::default()
        };
        Self::from_config(&config)
    }

    /// Creates a downloader from a configuration.
    ///
    /// The notifier is not set up here, since checking the topic needs a request;
    /// see [`Rutube::with_notifier`].
    pub fn from_config(config: &Config) -> Self {
        let ffmpeg = Ffmpeg::new(&config.ffmpeg).with_timeout(config.timeout());

        Self {
            transport: Arc::new(HttpFetcher::new()),
            media_tool: Arc::new(ffmpeg),
            notifier: None,
            output_dir: config.output_dir.clone(),
            api_base: config.api_base.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Replaces the HTTP transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replaces the media tool.
    pub fn with_media_tool(mut self, media_tool: Arc<dyn MediaTool>) -> Self {
        self.media_tool = media_tool;
        self
    }

    /// Sets where downloads are reported.
    pub fn with_notifier(mut self, notifier: Option<Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Resolves a page URL to the video's title and variants.
    ///
    /// The variants are ordered highest quality first.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the metadata or playlist request.
    /// A missing playlist URL in the metadata makes the playlist request fail.
    pub async fn fetch_video_info(&self, url: &str) -> Result<VideoInfo> {
        log::info!("Parsing info for '{}'...", url);

        let id = resolve_identifier(url);
        log::debug!("Video id: '{}'", id);

        let metadata =
            metadata::fetch_metadata(self.transport.as_ref(), &self.api_base, &self.user_agent, &id)
                .await?;

        let manifest_url = field::manifest_url(&metadata).unwrap_or_default();
        if manifest_url.is_empty() {
            log::warn!("No master playlist in the video metadata");
        }
        log::debug!("Master playlist: '{}'", manifest_url);

        let title = field::title(&metadata).map(str::to_string);
        log::info!("Title: '{}'", title.as_deref().unwrap_or_default());

        let mut variants =
            manifest::fetch_variants(self.transport.as_ref(), manifest_url, &self.user_agent)
                .await?;
        model::order_highest_first(&mut variants);

        Ok(VideoInfo {
            id,
            title,
            variants,
            metadata,
        })
    }

    /// Picks a variant according to the policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VariantIndex`] if the resolved position is out of range.
    pub fn select<'a>(
        &self,
        info: &'a VideoInfo,
        policy: SelectionPolicy,
    ) -> Result<&'a StreamVariant> {
        let len = info.variants.len();
        let index = policy.index(len);
        info.variants
            .get(index)
            .ok_or(Error::VariantIndex { index, len })
    }

    /// The path a video is saved to.
    pub fn destination(&self, info: &VideoInfo) -> PathBuf {
        self.output_dir.join(format!("{}.mp4", info.file_stem()))
    }

    /// Stream-copies a variant of the video into the output directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExternalTool`] if the media tool fails, or an IO error if
    /// the output directory can't be created.
    pub async fn download_variant(
        &self,
        info: &VideoInfo,
        variant: &StreamVariant,
    ) -> Result<PathBuf> {
        log::info!(
            "Downloading video in {} resolution...",
            variant.resolution
        );

        log::debug!("Selected variant: {}", variant);

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let destination = self.destination(info);

        if let Err(e) = self.media_tool.remux(&variant.url, &destination).await {
            log::error!("{}\tAborting...", e);
            return Err(e);
        }

        log::info!("Saved video in '{}'", destination.display());
        Ok(destination)
    }

    /// Downloads the video behind a page URL, choosing the variant with `policy`.
    ///
    /// Successes and failures are also posted to the notifier, if one is set.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the first failing step.
    pub async fn download(&self, url: &str, policy: SelectionPolicy) -> Result<PathBuf> {
        let result = self.download_inner(url, policy).await;
        self.report(url, &result).await;
        result
    }

    /// Posts the outcome of a download to the notifier, if one is set.
    pub async fn report(&self, url: &str, result: &Result<PathBuf>) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        match result {
            Ok(path) => {
                let text = format!("Saved video in '{}'", path.display());
                notifier.notify(Level::Info, "rutubedl", &text).await;
            }
            Err(e) => {
                let text = format!("Failed to download {}: {}", url, e);
                notifier.notify(Level::Error, "rutubedl", &text).await;
            }
        }
    }

    async fn download_inner(&self, url: &str, policy: SelectionPolicy) -> Result<PathBuf> {
        let info = self.fetch_video_info(url).await?;
        let variant = self.select(&info, policy)?;
        self.download_variant(&info, variant).await
    }

    /// Saves the video's thumbnail next to the video, as `<title>.jpg`.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata has no thumbnail or it can't be fetched or written.
    pub async fn download_thumbnail(&self, info: &VideoInfo) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let destination = self.output_dir.join(format!("{}.jpg", info.file_stem()));

        thumbnail::fetch_thumbnail(
            self.transport.as_ref(),
            &info.metadata,
            &self.user_agent,
            destination,
        )
        .await
    }
}
