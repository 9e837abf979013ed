//! Lookup maps from placeholder ids to resolved media.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a resolved image tag is written back into text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOutput {
    /// `![](url)`
    #[default]
    Markdown,
    Url,
}

impl ImageOutput {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "markdown" => Some(Self::Markdown),
            "url" => Some(Self::Url),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Url => "url",
        }
    }
}

/// Video map value: a bare URL, or a URL with an optional `"<w>*<h>"` size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VideoEntry {
    Url(String),
    Sized {
        #[serde(alias = "videoUrl")]
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<String>,
    },
}

impl VideoEntry {
    #[must_use]
    pub fn sized(url: impl Into<String>, size: Option<String>) -> Self {
        Self::Sized {
            url: url.into(),
            size,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) | Self::Sized { url, .. } => url,
        }
    }

    /// Parsed `(width, height)`; `None` when absent or malformed.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Self::Url(_) => None,
            Self::Sized { size, .. } => parse_video_size(size.as_deref()?),
        }
    }
}

/// Parses `"1280*720"`; both sides must be positive integers.
pub fn parse_video_size(size: &str) -> Option<(u32, u32)> {
    let (width, height) = size.split_once('*')?;
    let width = width.trim().parse::<u32>().ok()?;
    let height = height.trim().parse::<u32>().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    pub label: String,
}

/// Read-only id to URL lookups plus the image emission order.
///
/// Empty URLs are treated as unresolved by every lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderMaps {
    #[serde(alias = "imageMap")]
    pub image: BTreeMap<String, String>,
    #[serde(alias = "linkMap")]
    pub link: BTreeMap<String, String>,
    #[serde(alias = "videoMap")]
    pub video: BTreeMap<String, VideoEntry>,
    #[serde(alias = "uploadedImages")]
    pub uploaded: BTreeMap<String, UploadedImage>,
    #[serde(alias = "imageEmissionOrder")]
    pub emission_order: Vec<String>,
}

impl PlaceholderMaps {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_image(mut self, id: impl Into<String>, url: impl Into<String>) -> Self {
        self.image.insert(id.into(), url.into());
        self
    }

    #[must_use]
    pub fn with_link(mut self, id: impl Into<String>, url: impl Into<String>) -> Self {
        self.link.insert(id.into(), url.into());
        self
    }

    #[must_use]
    pub fn with_video(mut self, id: impl Into<String>, entry: VideoEntry) -> Self {
        self.video.insert(id.into(), entry);
        self
    }

    #[must_use]
    pub fn with_upload(
        mut self,
        id: impl Into<String>,
        url: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.uploaded.insert(
            id.into(),
            UploadedImage {
                url: url.into(),
                label: label.into(),
            },
        );
        self
    }

    #[must_use]
    pub fn with_emission_order<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emission_order = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn image_url(&self, id: &str) -> Option<&str> {
        non_empty(self.image.get(id).map(String::as_str))
    }

    pub fn link_url(&self, id: &str) -> Option<&str> {
        non_empty(self.link.get(id).map(String::as_str))
    }

    pub fn video(&self, id: &str) -> Option<&VideoEntry> {
        self.video.get(id).filter(|entry| !entry.url().is_empty())
    }

    pub fn upload(&self, id: &str) -> Option<&UploadedImage> {
        self.uploaded.get(id).filter(|upload| !upload.url.is_empty())
    }

    /// Position of the first occurrence of `id` in the emission order.
    pub fn emission_rank(&self, id: &str) -> Option<usize> {
        self.emission_order
            .iter()
            .position(|candidate| candidate == id)
    }

    /// Layers `other` on top: its entries win, its new emission ids are appended.
    pub fn merge(&mut self, other: PlaceholderMaps) {
        self.image.extend(other.image);
        self.link.extend(other.link);
        self.video.extend(other.video);
        self.uploaded.extend(other.uploaded);
        for id in other.emission_order {
            if !self.emission_order.contains(&id) {
                self.emission_order.push(id);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
            && self.link.is_empty()
            && self.video.is_empty()
            && self.uploaded.is_empty()
            && self.emission_order.is_empty()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
