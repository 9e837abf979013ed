//! Closed set of tool kinds recognised by name, with their result extractors.

use serde::Serialize;
use serde_json::Value;

use crate::core::text::utils::file_stem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchTool {
    Web,
    Multi,
    Google,
    Twitter,
    Youtube,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileTool {
    Read,
    Write,
    ApplyEdits,
    Delete,
    Grep,
    Info,
    ListWorkspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageTool {
    Gemini,
    Seedream,
    QwenEdit,
}

/// Video generator families, matched by tool name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoTool {
    Wan25,
    Grok,
    Upscaler,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "tool", rename_all = "snake_case")]
pub enum ToolKind {
    Search(SearchTool),
    File(FileTool),
    RunCode,
    Image(ImageTool),
    Video(VideoTool),
    Calculator,
    LinkReader,
    YoutubeAnalyzer,
    Other(String),
}

/// Adjacent units of the same class share one visual bubble run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseClass {
    Search,
    File,
}

impl ToolKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "web_search" => Self::Search(SearchTool::Web),
            "multi_search" => Self::Search(SearchTool::Multi),
            "google_search" => Self::Search(SearchTool::Google),
            "twitter_search" => Self::Search(SearchTool::Twitter),
            "youtube_search" => Self::Search(SearchTool::Youtube),
            "read_file" => Self::File(FileTool::Read),
            "write_file" => Self::File(FileTool::Write),
            "apply_edits" => Self::File(FileTool::ApplyEdits),
            "delete_file" => Self::File(FileTool::Delete),
            "grep_file" => Self::File(FileTool::Grep),
            "get_file_info" => Self::File(FileTool::Info),
            "list_workspace" => Self::File(FileTool::ListWorkspace),
            "run_python_code" => Self::RunCode,
            "gemini_image_tool" => Self::Image(ImageTool::Gemini),
            "seedream_image_tool" => Self::Image(ImageTool::Seedream),
            "qwen_image_edit" => Self::Image(ImageTool::QwenEdit),
            "calculator" | "math_calculation" => Self::Calculator,
            "link_reader" => Self::LinkReader,
            "youtube_link_analysis" | "youtube_link_analyzer" => Self::YoutubeAnalyzer,
            other if other.starts_with("wan25_") => Self::Video(VideoTool::Wan25),
            other if other.starts_with("grok_") => Self::Video(VideoTool::Grok),
            other if other.starts_with("video_upscaler") => Self::Video(VideoTool::Upscaler),
            other => Self::Other(other.to_string()),
        }
    }

    pub fn collapse_class(&self) -> Option<CollapseClass> {
        match self {
            Self::Search(_) => Some(CollapseClass::Search),
            Self::File(_) | Self::RunCode => Some(CollapseClass::File),
            _ => None,
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, Self::Search(_))
    }
}

/// Image or video produced by a generator tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedMedia {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl GeneratedMedia {
    /// Keys that identify the same output reported twice: its URL and its path.
    pub fn dedup_keys(&self) -> impl Iterator<Item = &str> + Clone {
        std::iter::once(self.url.as_str()).chain(self.path.as_deref())
    }

    /// Placeholder id derived from the output file name, e.g. `cat_01`.
    pub fn filename_id(&self) -> Option<&str> {
        self.path.as_deref().and_then(file_stem)
    }
}

/// Unwraps the `{ value: ... }` envelope some transports put around outputs.
pub fn unwrap_output(result: &Value) -> &Value {
    match result.get("value") {
        Some(inner) if inner.is_object() || inner.is_array() => inner,
        _ => result,
    }
}

pub fn is_failure(result: &Value) -> bool {
    result.get("success") == Some(&Value::Bool(false))
}

/// Per-sub-search entries of a search result (`searches`, else `results`).
pub fn search_entries(result: &Value) -> &[Value] {
    let result = unwrap_output(result);
    result
        .get("searches")
        .or_else(|| result.get("results"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// `(link_id, url)` pairs from a search result.
pub fn search_links(result: &Value) -> Vec<(String, String)> {
    let mut links = string_map(unwrap_output(result).get("linkMap"));
    for entry in search_entries(result) {
        for item in array_field(entry, "results") {
            if let (Some(id), Some(url)) = (str_field(item, "linkId"), str_field(item, "url")) {
                links.push((id.to_string(), url.to_string()));
            }
        }
    }
    links
}

/// `(image_id, url)` pairs from a search result.
pub fn search_images(result: &Value) -> Vec<(String, String)> {
    let mut images = string_map(unwrap_output(result).get("imageMap"));
    for entry in search_entries(result) {
        for item in array_field(entry, "images") {
            if let (Some(id), Some(url)) = (str_field(item, "id"), str_field(item, "url")) {
                images.push((id.to_string(), url.to_string()));
            }
        }
    }
    images
}

/// Images from a generator result: a bare array, `images`, or the result itself.
pub fn generated_images(result: &Value) -> Vec<GeneratedMedia> {
    let result = unwrap_output(result);
    if is_failure(result) {
        return Vec::new();
    }

    let candidates: Vec<&Value> = match result {
        Value::Array(items) => items.iter().collect(),
        _ => match result.get("images").and_then(Value::as_array) {
            Some(images) => images.iter().collect(),
            None if result.get("imageUrl").is_some() => vec![result],
            None => Vec::new(),
        },
    };
    candidates
        .into_iter()
        .filter_map(|image| media_from(image, "imageUrl"))
        .collect()
}

/// Videos listed under `videos` in a generator result.
pub fn generated_videos(result: &Value) -> Vec<GeneratedMedia> {
    let result = unwrap_output(result);
    if is_failure(result) {
        return Vec::new();
    }
    array_field(result, "videos")
        .iter()
        .filter_map(|video| media_from(video, "videoUrl"))
        .collect()
}

/// Media entries of a persisted result list; entries without a URL are skipped.
pub fn stored_media(list: &Value, url_key: &str) -> Vec<GeneratedMedia> {
    list.as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
        .iter()
        .filter_map(|item| media_from(item, url_key))
        .collect()
}

/// Single completed image or video from a `*_complete` data payload.
pub fn completed_media(payload: &Value, url_key: &str) -> Option<GeneratedMedia> {
    media_from(payload, url_key)
}

fn media_from(value: &Value, url_key: &str) -> Option<GeneratedMedia> {
    let url = str_field(value, url_key).filter(|url| !url.is_empty())?;
    Some(GeneratedMedia {
        url: url.to_string(),
        path: str_field(value, "path").map(ToString::to_string),
        size: str_field(value, "size").map(ToString::to_string),
    })
}

fn string_map(value: Option<&Value>) -> Vec<(String, String)> {
    value
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(id, url)| Some((id.clone(), url.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn array_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}
