//! Placeholder tag scanning.
//!
//! Grammars, matched left to right without overlap:
//! - `[IMAGE_ID:<id>]`, `[LINK_ID:<id>]`, `[VIDEO_ID:<id>]`
//! - bare `IMAGE_ID:<id>` (and link/video) after start-of-text or a non-word, non-`[` char
//! - `uploaded_image_<n>` (user-authored text only)

use std::ops::Range;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;

use super::fence::split_fenced;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    Image,
    Link,
    Video,
    UploadedImage,
}

impl PlaceholderKind {
    fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "IMAGE" => Self::Image,
            "LINK" => Self::Link,
            "VIDEO" => Self::Video,
            _ => return None,
        })
    }

    /// True for the `KIND_ID` tag kinds rewritten by the resolver.
    pub fn is_media_tag(&self) -> bool {
        !matches!(self, Self::UploadedImage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagForm {
    Bracketed,
    Bare,
    Token,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    pub id: String,
    /// Byte range of the whole tag within the scanned text.
    pub span: Range<usize>,
    pub form: TagForm,
}

fn placeholder_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(
            r"\[(IMAGE|LINK|VIDEO)_ID:([^\]]+)\]|(IMAGE|LINK|VIDEO)_ID:([A-Za-z0-9_.:-]+)|\b(uploaded_image_\d+)\b",
        )
        .expect("placeholder regex must compile")
    })
}

/// Cheap pre-check so untagged text skips the regex entirely.
pub fn may_contain_placeholder(text: &str) -> bool {
    text.contains("_ID:") || text.contains("uploaded_image_")
}

/// Scans every placeholder in `text`, including those inside code fences.
pub fn scan(text: &str) -> Vec<Placeholder> {
    if !may_contain_placeholder(text) {
        return Vec::new();
    }

    placeholder_regex()
        .captures_iter(text)
        .filter_map(|captures| placeholder_from_captures(text, &captures))
        .collect()
}

/// Scans placeholders outside fenced code blocks; spans refer to `text`.
pub fn scan_prose(text: &str) -> Vec<Placeholder> {
    if !may_contain_placeholder(text) {
        return Vec::new();
    }

    split_fenced(text)
        .into_iter()
        .filter(|chunk| !chunk.is_code)
        .flat_map(|chunk| {
            scan(chunk.text).into_iter().map(move |mut placeholder| {
                placeholder.span = placeholder.span.start + chunk.start
                    ..placeholder.span.end + chunk.start;
                placeholder
            })
        })
        .collect()
}

fn placeholder_from_captures(text: &str, captures: &Captures<'_>) -> Option<Placeholder> {
    let whole = captures.get(0)?;

    if let (Some(tag), Some(id)) = (captures.get(1), captures.get(2)) {
        // A blank id is still a tag; it simply never resolves.
        return Some(Placeholder {
            kind: PlaceholderKind::from_tag(tag.as_str())?,
            id: id.as_str().trim().to_string(),
            span: whole.range(),
            form: TagForm::Bracketed,
        });
    }

    if let (Some(tag), Some(id)) = (captures.get(3), captures.get(4)) {
        if !bare_prefix_allowed(text, whole.start()) {
            return None;
        }
        return Some(Placeholder {
            kind: PlaceholderKind::from_tag(tag.as_str())?,
            id: id.as_str().to_string(),
            span: whole.range(),
            form: TagForm::Bare,
        });
    }

    let token = captures.get(5)?;
    Some(Placeholder {
        kind: PlaceholderKind::UploadedImage,
        id: token.as_str().to_string(),
        span: token.range(),
        form: TagForm::Token,
    })
}

fn bare_prefix_allowed(text: &str, start: usize) -> bool {
    match text[..start].chars().next_back() {
        None => true,
        Some(ch) => !(ch.is_alphanumeric() || ch == '_' || ch == '['),
    }
}
