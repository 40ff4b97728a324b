//! Source URL helpers.

use once_cell::sync::Lazy;
use regex::Regex;

static VIDEO_ID_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]v=([^&]+)").expect("video id pattern is a valid regex"));

/// Extract the `v` query parameter from a video URL.
///
/// Input that carries no such parameter is returned unchanged, so a bare
/// video id passes straight through.
pub fn video_id_from_url(url: &str) -> &str {
    VIDEO_ID_PARAM
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map_or(url, |id| id.as_str())
}
