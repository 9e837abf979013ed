use serde::Serialize;

use crate::core::maps::PlaceholderMaps;
use crate::core::text::placeholder::{scan, PlaceholderKind};

/// Piece of user-authored text: literal text or a resolved upload reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineRun {
    Text { text: String },
    Chip { id: String, url: String, label: String },
}

/// Splits `text` around resolvable `uploaded_image_<n>` tokens.
///
/// Unknown tokens stay in the surrounding text. Adjacent text is merged.
pub fn split_upload_chips(text: &str, maps: &PlaceholderMaps) -> Vec<InlineRun> {
    let mut runs = Vec::new();
    let mut cursor = 0;

    for token in scan(text)
        .into_iter()
        .filter(|tag| tag.kind == PlaceholderKind::UploadedImage)
    {
        let Some(upload) = maps.upload(&token.id) else {
            continue;
        };
        if token.span.start > cursor {
            runs.push(InlineRun::Text {
                text: text[cursor..token.span.start].to_string(),
            });
        }
        runs.push(InlineRun::Chip {
            id: token.id,
            url: upload.url.clone(),
            label: upload.label.clone(),
        });
        cursor = token.span.end;
    }

    if cursor < text.len() {
        runs.push(InlineRun::Text {
            text: text[cursor..].to_string(),
        });
    }
    runs
}
