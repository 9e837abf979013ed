//! Conversation-wide placeholder maps derived from part history.
//!
//! Numbering (`uploaded_image_<n>`, `generated_image_<n>`, `generated_video_<n>`)
//! runs across the whole conversation in part order, so the same history always
//! yields the same ids.

use std::collections::{BTreeMap, BTreeSet};

use message_parts::{Message, Part};
use serde_json::Value;

use crate::core::maps::{PlaceholderMaps, UploadedImage, VideoEntry};
use crate::segment::tool_kind::{
    completed_media, generated_images, generated_videos, search_images, search_links,
    stored_media, GeneratedMedia, ToolKind,
};

const DEFAULT_UPLOAD_LABEL: &str = "image.jpg";

/// Persisted image result lists; the first one present is used.
const STORED_IMAGE_RESULTS: [&str; 3] =
    ["geminiImageResults", "seedreamImageResults", "qwenImageResults"];

/// Persisted video result lists; all of them are read in this order.
const STORED_VIDEO_RESULTS: [&str; 3] =
    ["wan25VideoResults", "grokVideoResults", "videoUpscalerResults"];

/// Whether a message's parts already produced generated media.
#[derive(Debug, Default, Clone, Copy)]
struct FoundInParts {
    images: bool,
    videos: bool,
}

#[derive(Debug)]
pub struct MediaIndex {
    maps: PlaceholderMaps,
    next_upload: usize,
    next_image: usize,
    next_video: usize,
    seen_images: BTreeSet<String>,
    seen_videos: BTreeSet<String>,
}

impl Default for MediaIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaIndex {
    pub fn new() -> Self {
        Self {
            maps: PlaceholderMaps::default(),
            next_upload: 1,
            next_image: 1,
            next_video: 1,
            seen_images: BTreeSet::new(),
            seen_videos: BTreeSet::new(),
        }
    }

    pub fn from_messages<'a, I>(messages: I) -> PlaceholderMaps
    where
        I: IntoIterator<Item = &'a Message>,
    {
        let mut index = Self::new();
        for message in messages {
            index.add_message(message);
        }
        index.into_maps()
    }

    pub fn add_message(&mut self, message: &Message) {
        for attachment in message.uploaded_images() {
            let id = format!("uploaded_image_{}", self.next_upload);
            self.next_upload += 1;
            let label = attachment
                .filename
                .clone()
                .unwrap_or_else(|| DEFAULT_UPLOAD_LABEL.to_string());
            self.maps.image.insert(id.clone(), attachment.url.clone());
            self.maps.uploaded.insert(
                id,
                UploadedImage {
                    url: attachment.url.clone(),
                    label,
                },
            );
        }

        let tool_names: BTreeMap<&str, &str> = message
            .parts()
            .iter()
            .filter_map(|part| match part {
                Part::ToolCall(call) => Some((call.tool_call_id.as_str(), call.tool_name.as_str())),
                _ => None,
            })
            .collect();

        let mut found = FoundInParts::default();
        for part in message.parts() {
            match part {
                Part::ToolResult(result) => {
                    let tool_name = result
                        .tool_name
                        .as_deref()
                        .or_else(|| tool_names.get(result.tool_call_id.as_str()).copied());
                    if let Some(tool_name) = tool_name {
                        self.add_tool_result(tool_name, &result.result, &mut found);
                    }
                }
                Part::Data { kind, payload } => self.add_data(kind, payload),
                _ => {}
            }
        }

        if let Some(stored) = &message.tool_results {
            self.add_stored_results(stored, found);
        }
    }

    pub fn into_maps(self) -> PlaceholderMaps {
        self.maps
    }

    fn add_tool_result(&mut self, tool_name: &str, result: &Value, found: &mut FoundInParts) {
        match ToolKind::from_name(tool_name) {
            ToolKind::Image(_) => {
                for image in generated_images(result) {
                    found.images |= self.add_image(image);
                }
            }
            ToolKind::Video(_) => {
                for video in generated_videos(result) {
                    found.videos |= self.add_video(video);
                }
            }
            ToolKind::Search(_) => {
                self.maps.link.extend(search_links(result));
                self.maps.image.extend(search_images(result));
            }
            _ => {}
        }
    }

    /// Falls back to the lists persisted with a stored message when its parts
    /// produced no media of that type.
    fn add_stored_results(&mut self, stored: &Value, found: FoundInParts) {
        if !found.images {
            let images = STORED_IMAGE_RESULTS
                .iter()
                .find_map(|key| stored.get(*key).filter(|list| !list.is_null()));
            for image in images.map(|list| stored_media(list, "imageUrl")).unwrap_or_default() {
                self.add_image(image);
            }
        }
        if !found.videos {
            let videos: Vec<GeneratedMedia> = STORED_VIDEO_RESULTS
                .iter()
                .filter_map(|key| stored.get(*key))
                .flat_map(|list| stored_media(list, "videoUrl"))
                .collect();
            for video in videos {
                self.add_video(video);
            }
        }
    }

    fn add_data(&mut self, kind: &str, payload: &Value) {
        if kind.ends_with("_image_complete") {
            if let Some(image) = completed_media(payload, "imageUrl") {
                self.add_image(image);
            }
        } else if kind.ends_with("_video_complete") || kind == "video_upscaler_complete" {
            if let Some(video) = completed_media(payload, "videoUrl") {
                self.add_video(video);
            }
        }
    }

    fn add_image(&mut self, image: GeneratedMedia) -> bool {
        if !first_sighting(&mut self.seen_images, &image) {
            return false;
        }

        let id = format!("generated_image_{}", self.next_image);
        self.next_image += 1;
        self.maps.image.insert(id.clone(), image.url.clone());
        self.push_emission(id);

        if let Some(filename_id) = image.filename_id() {
            self.maps
                .image
                .insert(filename_id.to_string(), image.url.clone());
            self.push_emission(filename_id.to_string());
        }
        tracing::trace!(url = %image.url, "indexed generated image");
        true
    }

    fn add_video(&mut self, video: GeneratedMedia) -> bool {
        if !first_sighting(&mut self.seen_videos, &video) {
            return false;
        }

        let entry = match &video.size {
            Some(size) => VideoEntry::sized(video.url.clone(), Some(size.clone())),
            None => VideoEntry::Url(video.url.clone()),
        };
        let id = format!("generated_video_{}", self.next_video);
        self.next_video += 1;
        self.maps.video.insert(id, entry.clone());

        if let Some(filename_id) = video.filename_id() {
            self.maps
                .video
                .entry(filename_id.to_string())
                .or_insert(entry);
        }
        true
    }

    fn push_emission(&mut self, id: String) {
        if !self.maps.emission_order.contains(&id) {
            self.maps.emission_order.push(id);
        }
    }
}

/// Records `media` unless its URL or path was already indexed.
fn first_sighting(seen: &mut BTreeSet<String>, media: &GeneratedMedia) -> bool {
    let keys = media.dedup_keys();
    if keys.clone().any(|key| seen.contains(key)) {
        return false;
    }
    seen.extend(keys.map(ToString::to_string));
    true
}
