//! The data types moving through the download pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod field;

/// One quality rendition declared in a master playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamVariant {
    /// The declared peak bandwidth, in bits per second.
    pub bandwidth: u64,
    /// The frame rate, kept as written (`25` or `29.970`).
    pub framerate: String,
    /// The codecs string, without its quotes.
    pub codecs: String,
    /// The resolution, formatted `WxH`.
    pub resolution: String,
    /// The URL of the variant's media playlist.
    pub url: String,
}

impl fmt::Display for StreamVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} fps, {} bps, {})",
            self.resolution, self.framerate, self.bandwidth, self.codecs
        )
    }
}

/// Orders variants highest quality first, by declared bandwidth.
///
/// The sort is stable: variants with equal bandwidth keep their playlist order.
/// Playlists listing ascending quality come out reversed, and playlists that
/// already list the best variant first are left as they are.
pub fn order_highest_first(variants: &mut [StreamVariant]) {
    variants.sort_by(|a, b| b.bandwidth.cmp(&a.bandwidth));
}

/// What the caller knows about a video once metadata and playlist are resolved.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    /// The identifier cut from the page URL.
    pub id: String,
    /// The title from the metadata, if any.
    pub title: Option<String>,
    /// The available variants, highest quality first.
    pub variants: Vec<StreamVariant>,
    /// The raw play-options document.
    pub metadata: serde_json::Value,
}

impl VideoInfo {
    /// The base name of the files written for this video.
    ///
    /// Falls back to the identifier when the metadata has no title. Path
    /// separators are replaced so the file lands in the output directory.
    pub fn file_stem(&self) -> String {
        self.title
            .as_deref()
            .unwrap_or(&self.id)
            .replace(['/', '\\'], "_")
    }
}

/// How a variant is picked from a list ordered highest quality first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// An explicit zero-based position.
    Index(usize),
    /// The first entry.
    Best,
    /// The middle entry, `len / 2`.
    Average,
    /// The last entry.
    Worst,
}

impl SelectionPolicy {
    /// Resolves the policy to a position in a list of `len` variants.
    ///
    /// The result is not bounds-checked; `Worst` on an empty list saturates to 0.
    pub fn index(&self, len: usize) -> usize {
        match self {
            SelectionPolicy::Index(index) => *index,
            SelectionPolicy::Best => 0,
            SelectionPolicy::Average => len / 2,
            SelectionPolicy::Worst => len.saturating_sub(1),
        }
    }
}

impl FromStr for SelectionPolicy {
    type Err = String;

    /// Accepts `best`, `average`, `worst`, or a 1-based position.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best" => Ok(SelectionPolicy::Best),
            "average" => Ok(SelectionPolicy::Average),
            "worst" => Ok(SelectionPolicy::Worst),
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(SelectionPolicy::Index(n - 1)),
                _ => Err(format!(
                    "'{s}' is not one of best, average, worst or a number starting at 1"
                )),
            },
        }
    }
}
