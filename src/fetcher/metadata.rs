//! Fetching the play-options metadata of a video.

use crate::error::{Error, Result};
use crate::fetcher::{Transport, base_headers};
use reqwest::header::{ACCEPT, HeaderValue};
use serde_json::Value;

/// The default base of the play-options API.
pub const DEFAULT_API_BASE: &str = "https://rutube.ru/api/play/options";

/// Returns the play-options URL for a video identifier.
pub fn api_url(api_base: &str, id: &str) -> String {
    format!("{}/{}", api_base.trim_end_matches('/'), id)
}

/// Requests the play-options document of a video.
///
/// # Arguments
///
/// * `transport` - The transport used for the single GET request.
/// * `api_base` - The base URL of the play-options API.
/// * `user_agent` - The user agent to send.
/// * `id` - The video identifier.
///
/// # Errors
///
/// Returns [`Error::InvalidLink`] on a 404, [`Error::Upstream`] on any other
/// non-200 status, and [`Error::Serde`] if a 200 body is not JSON.
pub async fn fetch_metadata(
    transport: &dyn Transport,
    api_base: &str,
    user_agent: &str,
    id: &str,
) -> Result<Value> {
    let url = api_url(api_base, id);
    log::debug!("Fetching metadata from {}", url);

    let mut headers = base_headers(user_agent);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let response = transport.get(&url, headers).await?;
    match response.status {
        200 => Ok(serde_json::from_slice(&response.body)?),
        404 => {
            log::error!("Invalid link!");
            Err(Error::InvalidLink)
        }
        status => {
            log::error!("Can't reach rutube API! Status code: {}", status);
            Err(Error::Upstream(status))
        }
    }
}
