//! Grapheme-safe truncation and small string helpers for tool summaries.

use unicode_segmentation::UnicodeSegmentation;
use url::Url;

pub fn grapheme_segments(text: &str) -> unicode_segmentation::Graphemes<'_> {
    UnicodeSegmentation::graphemes(text, true)
}

/// Keeps at most `max_graphemes` clusters and appends `ellipsis` when anything was cut.
pub fn truncate_graphemes(text: &str, max_graphemes: usize, ellipsis: &str) -> String {
    let mut segments = grapheme_segments(text);
    let mut result = String::with_capacity(text.len().min(max_graphemes * 4));
    for _ in 0..max_graphemes {
        match segments.next() {
            Some(segment) => result.push_str(segment),
            None => return result,
        }
    }

    if segments.next().is_some() {
        result.push_str(ellipsis);
    }
    result
}

/// Host of `value` without a leading `www.`; falls back to the raw value.
pub fn display_host(value: &str) -> String {
    match Url::parse(value) {
        Ok(url) => match url.host_str() {
            Some(host) => host.strip_prefix("www.").unwrap_or(host).to_string(),
            None => value.to_string(),
        },
        Err(_) => value.to_string(),
    }
}

/// File name of a `/`-separated path with its last extension removed.
pub fn file_stem(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next()?;
    let stem = match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    };
    (!stem.is_empty()).then_some(stem)
}
