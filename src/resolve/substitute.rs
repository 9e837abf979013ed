use crate::core::maps::{ImageOutput, PlaceholderMaps};
use crate::core::text::placeholder::{Placeholder, PlaceholderKind};

use super::{ResolveOptions, UnresolvedPolicy};

/// Replacement text for one tag; `raw` is the tag as written.
pub fn substitute(
    tag: &Placeholder,
    raw: &str,
    maps: &PlaceholderMaps,
    options: &ResolveOptions,
) -> String {
    let replacement = match tag.kind {
        PlaceholderKind::Image => maps.image_url(&tag.id).map(|url| match options.image_output {
            ImageOutput::Markdown => format!("![]({url})"),
            ImageOutput::Url => url.to_string(),
        }),
        PlaceholderKind::Link => maps.link_url(&tag.id).map(ToString::to_string),
        PlaceholderKind::Video => maps.video(&tag.id).map(|entry| match entry.dimensions() {
            Some((width, height)) => format!("{}#w={width}&h={height}", entry.url()),
            None => entry.url().to_string(),
        }),
        PlaceholderKind::UploadedImage => return raw.to_string(),
    };

    match (replacement, options.unresolved) {
        (Some(replacement), _) => replacement,
        (None, UnresolvedPolicy::Keep) => raw.to_string(),
        (None, UnresolvedPolicy::Remove) => {
            tracing::debug!(kind = ?tag.kind, id = %tag.id, "removing unresolved placeholder");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::maps::{PlaceholderMaps, VideoEntry};
    use crate::core::text::placeholder::scan;
    use crate::resolve::ResolveOptions;

    use super::substitute;

    fn substitute_one(text: &str, maps: &PlaceholderMaps) -> String {
        let tag = scan(text).remove(0);
        substitute(&tag, &text[tag.span.clone()], maps, &ResolveOptions::default())
    }

    #[test]
    fn malformed_video_size_keeps_plain_url() {
        let maps = PlaceholderMaps::new().with_video(
            "v",
            VideoEntry::sized("https://v/a.mp4", Some("big".to_string())),
        );
        assert_eq!(substitute_one("[VIDEO_ID:v]", &maps), "https://v/a.mp4");
    }

    #[test]
    fn bare_video_url_entry_is_used_as_is() {
        let maps =
            PlaceholderMaps::new().with_video("v", VideoEntry::Url("https://v/b.mp4".to_string()));
        assert_eq!(substitute_one("VIDEO_ID:v", &maps), "https://v/b.mp4");
    }

    #[test]
    fn link_substitutes_bare_url() {
        let maps = PlaceholderMaps::new().with_link("l", "https://docs.rs");
        assert_eq!(substitute_one("[LINK_ID:l]", &maps), "https://docs.rs");
    }

    #[test]
    fn unresolved_tag_is_removed() {
        assert_eq!(substitute_one("[VIDEO_ID:none]", &PlaceholderMaps::new()), "");
    }
}
