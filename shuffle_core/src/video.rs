use once_cell::sync::Lazy;
use regex::Regex;

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]v=([^#&?]*)").unwrap());

/// Extracts the `v` query parameter of a YouTube watch URL.
///
/// The value stops at the first `#`, `&` or `?`. An empty value is treated as absent.
pub fn video_id(url: &str) -> Option<&str> {
    VIDEO_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|id| !id.is_empty())
}

pub fn embed_url(url: &str) -> Option<String> {
    video_id(url).map(|id| format!("https://www.youtube.com/embed/{id}"))
}
