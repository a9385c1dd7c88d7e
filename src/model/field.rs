//! Dotted-path lookups over the play-options metadata.
//!
//! The metadata schema is not guaranteed, so every accessor answers `None`
//! for anything it cannot reach instead of failing.

use serde_json::Value;

/// Path of the master playlist URL in the metadata.
pub const MANIFEST_URL_PATH: &str = "video_balancer.default";
/// Path of the video title in the metadata.
pub const TITLE_PATH: &str = "title";
/// Path of the thumbnail URL in the metadata.
pub const THUMBNAIL_URL_PATH: &str = "thumbnail_url";

/// Walks `doc` along `path`, a sequence of keys separated by `.`.
///
/// Objects are indexed by key and arrays by numeric position. A missing key,
/// an out-of-range index or a scalar in the middle of the path all yield `None`.
///
/// # Examples
///
/// ```rust
/// # use rutubedl::model::field::get_field;
/// # use serde_json::json;
/// let doc = json!({"a": {"b": 1}});
/// assert_eq!(get_field(&doc, "a.b"), Some(&json!(1)));
/// assert_eq!(get_field(&doc, "a.b.c"), None);
/// ```
pub fn get_field<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn get_str<'a>(doc: &'a Value, path: &str) -> Option<&'a str> {
    get_field(doc, path).and_then(Value::as_str)
}

/// Returns the master playlist URL.
pub fn manifest_url(doc: &Value) -> Option<&str> {
    get_str(doc, MANIFEST_URL_PATH)
}

/// Returns the video title.
pub fn title(doc: &Value) -> Option<&str> {
    get_str(doc, TITLE_PATH)
}

/// Returns the thumbnail URL.
pub fn thumbnail_url(doc: &Value) -> Option<&str> {
    get_str(doc, THUMBNAIL_URL_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_top_level_key_is_absent() {
        let doc = json!({"title": "Demo"});
        assert_eq!(get_field(&doc, "author"), None);
    }

    #[test]
    fn scalar_in_the_middle_is_absent() {
        let doc = json!({"a": {"b": 1}});
        assert_eq!(get_field(&doc, "a.b.c"), None);
        assert_eq!(get_field(&doc, "a.b.c.d.e"), None);
    }

    #[test]
    fn arrays_are_indexed_by_position() {
        let doc = json!({"list": [{"name": "first"}, {"name": "second"}]});
        assert_eq!(get_field(&doc, "list.1.name"), Some(&json!("second")));
        assert_eq!(get_field(&doc, "list.5.name"), None);
        assert_eq!(get_field(&doc, "list.name"), None);
    }

    #[test]
    fn derived_accessors_read_strings_only() {
        let doc = json!({
            "title": "Demo",
            "video_balancer": {"default": "http://m.example/pl.m3u8"},
            "thumbnail_url": null,
        });
        assert_eq!(title(&doc), Some("Demo"));
        assert_eq!(manifest_url(&doc), Some("http://m.example/pl.m3u8"));
        assert_eq!(thumbnail_url(&doc), None);
        assert_eq!(manifest_url(&json!({"video_balancer": 5})), None);
    }
}
