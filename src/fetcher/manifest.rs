//! Fetching and parsing HLS master playlists.
//!
//! A master playlist declares each variant on a `#EXT-X-STREAM-INF:` line of
//! comma-separated `KEY=VALUE` attributes, followed by the line holding the
//! variant's URL:
//!
//! ```text
//! #EXT-X-STREAM-INF:BANDWIDTH=1280000,FRAME-RATE=25,CODECS="avc1.4d401f,mp4a.40.2",RESOLUTION=1280x720
//! https://example.com/720.m3u8
//! ```

use crate::error::{Error, Result};
use crate::fetcher::{Transport, base_headers};
use crate::model::StreamVariant;
use regex::Regex;
use std::sync::LazyLock;

/// The marker introducing a stream declaration.
pub const STREAM_INF: &str = "#EXT-X-STREAM-INF:";

static BANDWIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[,\s])BANDWIDTH=(\d+)").unwrap());
static FRAME_RATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[,\s])FRAME-RATE=(\d+(?:\.\d+)?)").unwrap());
static CODECS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:^|[,\s])CODECS="([^"]+)""#).unwrap());
static RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[,\s])RESOLUTION=(\d+x\d+)").unwrap());

/// Requests a master playlist and lists its variants.
///
/// The body is parsed whatever the status, so the log shows what the server sent,
/// but only a 200 response yields the variants.
///
/// # Errors
///
/// Returns [`Error::ManifestFetch`] on any non-200 status, or [`Error::Transport`]
/// if the server could not be reached (including an empty or invalid URL).
pub async fn fetch_variants(
    transport: &dyn Transport,
    manifest_url: &str,
    user_agent: &str,
) -> Result<Vec<StreamVariant>> {
    log::debug!("Fetching master playlist from '{}'", manifest_url);

    let response = transport.get(manifest_url, base_headers(user_agent)).await?;
    let variants = parse_manifest(&response.text());

    if !response.is_ok() {
        log::error!(
            "Can't get available streams!\tStatus code: {}",
            response.status
        );
        log::debug!("Body listed {} variant(s) anyway", variants.len());
        return Err(Error::ManifestFetch(response.status));
    }

    Ok(variants)
}

/// Extracts the variants of a master playlist, in playlist order.
///
/// A variant whose resolution equals the one accepted right before it is a
/// mirror and is dropped. Only adjacent duplicates are caught: the same
/// resolution appearing again later in the playlist is kept.
///
/// Declarations missing a required attribute are logged and skipped; they do
/// not take part in the duplicate check.
pub fn parse_manifest(content: &str) -> Vec<StreamVariant> {
    let mut variants: Vec<StreamVariant> = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(attributes) = line.trim().strip_prefix(STREAM_INF) else {
            continue;
        };
        let Some(url) = lines.next() else {
            log::warn!("Stream declaration without URL at end of playlist");
            break;
        };

        let variant = match parse_variant(attributes, url.trim()) {
            Ok(variant) => variant,
            Err(e) => {
                log::warn!("Skipping stream: {}", e);
                continue;
            }
        };

        // mirror of the previous variant
        if variants
            .last()
            .is_some_and(|last| last.resolution == variant.resolution)
        {
            continue;
        }
        variants.push(variant);
    }

    variants
}

/// Builds a variant from the attributes of a declaration and its URL line.
///
/// # Errors
///
/// Returns [`Error::MalformedManifest`] naming the first missing attribute.
pub fn parse_variant(attributes: &str, url: &str) -> Result<StreamVariant> {
    let bandwidth = capture(&BANDWIDTH, attributes, "BANDWIDTH")?
        .parse::<u64>()
        .map_err(|_| Error::MalformedManifest("BANDWIDTH".to_string()))?;

    Ok(StreamVariant {
        bandwidth,
        framerate: capture(&FRAME_RATE, attributes, "FRAME-RATE")?.to_string(),
        codecs: capture(&CODECS, attributes, "CODECS")?.to_string(),
        resolution: capture(&RESOLUTION, attributes, "RESOLUTION")?.to_string(),
        url: url.to_string(),
    })
}

fn capture<'a>(re: &Regex, attributes: &'a str, name: &str) -> Result<&'a str> {
    re.captures(attributes)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::MalformedManifest(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::DEFAULT_USER_AGENT;
    use crate::fetcher::testing::FakeTransport;

    fn entry(bandwidth: u64, resolution: &str, url: &str) -> String {
        format!(
            "#EXT-X-STREAM-INF:BANDWIDTH={bandwidth},FRAME-RATE=25,CODECS=\"avc1.42c01e,mp4a.40.2\",RESOLUTION={resolution}\n{url}\n"
        )
    }

    fn playlist(entries: &[(u64, &str, &str)]) -> String {
        let mut content = String::from("#EXTM3U\n");
        for (bandwidth, resolution, url) in entries {
            content.push_str(&entry(*bandwidth, resolution, url));
        }
        content
    }

    fn resolutions(variants: &[StreamVariant]) -> Vec<&str> {
        variants.iter().map(|v| v.resolution.as_str()).collect()
    }

    #[test]
    fn parses_all_attributes() {
        let content = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=2500000,FRAME-RATE=29.970,CODECS=\"avc1.4d401f,mp4a.40.2\",RESOLUTION=1280x720\nhttps://cdn.example/720.m3u8?i=1\n";

        let variants = parse_manifest(content);

        assert_eq!(
            variants,
            vec![StreamVariant {
                bandwidth: 2_500_000,
                framerate: "29.970".to_string(),
                codecs: "avc1.4d401f,mp4a.40.2".to_string(),
                resolution: "1280x720".to_string(),
                url: "https://cdn.example/720.m3u8?i=1".to_string(),
            }]
        );
    }

    #[test]
    fn attribute_order_does_not_matter() {
        let content = "#EXT-X-STREAM-INF:RESOLUTION=640x360,CODECS=\"avc1\",AVERAGE-BANDWIDTH=1,FRAME-RATE=30,BANDWIDTH=800000\nlow.m3u8\n";

        let variants = parse_manifest(content);

        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].bandwidth, 800_000);
        assert_eq!(variants[0].framerate, "30");
        assert_eq!(variants[0].resolution, "640x360");
        assert_eq!(variants[0].url, "low.m3u8");
    }

    #[test]
    fn adjacent_mirrors_are_dropped() {
        let content = playlist(&[
            (3_000_000, "1280x720", "a.m3u8"),
            (3_000_000, "1280x720", "mirror.m3u8"),
            (1_000_000, "854x480", "b.m3u8"),
        ]);

        let variants = parse_manifest(&content);

        assert_eq!(resolutions(&variants), vec!["1280x720", "854x480"]);
        assert_eq!(variants[0].url, "a.m3u8");
    }

    #[test]
    fn non_adjacent_duplicates_are_kept() {
        let content = playlist(&[
            (3_000_000, "1280x720", "a.m3u8"),
            (1_000_000, "854x480", "b.m3u8"),
            (3_000_000, "1280x720", "c.m3u8"),
        ]);

        let variants = parse_manifest(&content);

        assert_eq!(
            resolutions(&variants),
            vec!["1280x720", "854x480", "1280x720"]
        );
    }

    #[test]
    fn malformed_declarations_are_skipped() {
        let content = format!(
            "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1,FRAME-RATE=25,CODECS=\"avc1\"\nnores.m3u8\n{}",
            entry(2, "640x360", "ok.m3u8")
        );

        let variants = parse_manifest(&content);

        assert_eq!(resolutions(&variants), vec!["640x360"]);
        assert!(matches!(
            parse_variant("BANDWIDTH=1,FRAME-RATE=25,CODECS=\"avc1\"", "x"),
            Err(Error::MalformedManifest(name)) if name == "RESOLUTION"
        ));
    }

    #[test]
    fn spaces_after_commas_are_accepted() {
        let content = "#EXT-X-STREAM-INF:BANDWIDTH=1, FRAME-RATE=25, CODECS=\"avc1\", RESOLUTION=640x360\nu\n";

        let variants = parse_manifest(content);

        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].bandwidth, 1);
        assert_eq!(variants[0].resolution, "640x360");
        assert_eq!(variants[0].url, "u");
    }

    #[test]
    fn other_tags_and_crlf_are_ignored() {
        let content = "#EXTM3U\r\n#EXT-X-VERSION:3\r\n#EXT-X-STREAM-INF:BANDWIDTH=5,FRAME-RATE=25,CODECS=\"avc1\",RESOLUTION=1920x1080\r\nhd.m3u8\r\n#EXT-X-ENDLIST\r\n";

        let variants = parse_manifest(content);

        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].url, "hd.m3u8");
    }

    #[tokio::test]
    async fn non_ok_status_is_manifest_error() {
        let body = playlist(&[(1, "640x360", "a.m3u8")]);
        let transport = FakeTransport::default().route("http://m/pl.m3u8", 403, &body);

        let result = fetch_variants(&transport, "http://m/pl.m3u8", DEFAULT_USER_AGENT).await;

        assert!(matches!(result, Err(Error::ManifestFetch(403))));
    }

    #[tokio::test]
    async fn ok_status_returns_variants_in_order() {
        let body = playlist(&[(1, "640x360", "a.m3u8"), (2, "1280x720", "b.m3u8")]);
        let transport = FakeTransport::default().route("http://m/pl.m3u8", 200, &body);

        let variants = fetch_variants(&transport, "http://m/pl.m3u8", DEFAULT_USER_AGENT)
            .await
            .unwrap();

        assert_eq!(resolutions(&variants), vec!["640x360", "1280x720"]);
    }
}
