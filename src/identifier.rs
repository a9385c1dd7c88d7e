//! Extraction of video identifiers from page URLs.

/// Prefixes removed from the start of a URL, in this order, each at most once.
///
/// `yappy` links are not served by the play-options API but are still stripped
/// so the request fails downstream with a classified error.
const PREFIXES: [&str; 7] = [
    "http://",
    "https://",
    "rutube.ru/",
    "video",
    "yappy",
    "shorts",
    "/",
];

/// Cuts the video identifier out of a rutube URL.
///
/// Every known prefix is stripped, then everything from the first remaining
/// `/` onward is discarded. The character set is not validated: malformed input
/// yields an identifier that the metadata API rejects.
///
/// # Examples
///
/// ```rust
/// # use rutubedl::identifier::resolve_identifier;
/// let id = resolve_identifier("https://rutube.ru/video/abcdef123/?param=1");
/// assert_eq!(id, "abcdef123");
/// ```
pub fn resolve_identifier(raw_url: &str) -> String {
    let stripped = PREFIXES
        .iter()
        .fold(raw_url, |rest, prefix| rest.strip_prefix(prefix).unwrap_or(rest));

    match stripped.split_once('/') {
        Some((id, _tail)) => id.to_string(),
        None => stripped.to_string(),
    }
}
