//! Display descriptors for tool units: status, name, one-line summary, panel route.

use serde::Serialize;
use serde_json::Value;

use super::expand::ToolUnit;
use super::tool_kind::{
    is_failure, search_entries, unwrap_output, FileTool, ImageTool, SearchTool, ToolKind,
    VideoTool,
};
use crate::core::text::utils::{display_host, truncate_graphemes};

const PROMPT_SUMMARY_GRAPHEMES: usize = 50;
const PATH_SUMMARY_GRAPHEMES: usize = 40;
const DEFAULT_SEARCH_TOPIC: &str = "general";
const DEFAULT_GOOGLE_ENGINE: &str = "google";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Processing,
    Completed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub kind: ToolKind,
    pub status: ToolStatus,
    pub display_name: String,
    pub summary: String,
    /// Key the info panel uses to pick its view, e.g. `web-search:topic:news`.
    pub panel_route: String,
    /// Value the panel filters on (query, URL, expression, or path).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_identifier: Option<String>,
}

pub fn describe(unit: &ToolUnit) -> ToolDescriptor {
    let kind = unit.kind();
    let args = &unit.call.args;
    let result = unit.result.as_ref().map(unwrap_output);

    ToolDescriptor {
        status: status(&kind, result),
        display_name: display_name(&kind, unit.tool_name(), args, result),
        summary: summary(args),
        panel_route: panel_route(&kind, unit.tool_name(), args, result),
        item_identifier: item_identifier(&kind, args),
        kind,
    }
}

fn status(kind: &ToolKind, result: Option<&Value>) -> ToolStatus {
    let Some(result) = result else {
        return ToolStatus::Processing;
    };
    if is_failure(result) {
        return ToolStatus::Error;
    }

    let produced = match kind {
        ToolKind::Image(_) => has_media(result, "imageUrl", "images"),
        ToolKind::Video(_) => has_media(result, "videoUrl", "videos"),
        _ => true,
    };
    if produced {
        ToolStatus::Completed
    } else {
        ToolStatus::Processing
    }
}

fn has_media(result: &Value, url_key: &str, list_key: &str) -> bool {
    if let Value::Array(items) = result {
        return !items.is_empty();
    }
    truthy(result.get(url_key))
        || truthy(result.get("path"))
        || result
            .get(list_key)
            .and_then(Value::as_array)
            .is_some_and(|items| !items.is_empty())
}

fn display_name(kind: &ToolKind, tool_name: &str, args: &Value, result: Option<&Value>) -> String {
    match kind {
        ToolKind::Search(SearchTool::Web | SearchTool::Multi) => {
            match search_topic(args, result) {
                Some(topic) => topic_name(&topic).to_string(),
                None => "Web Search".to_string(),
            }
        }
        ToolKind::Search(SearchTool::Google) => topic_name(&google_engine(args, result)).to_string(),
        ToolKind::Search(SearchTool::Twitter) => "X Search".to_string(),
        ToolKind::Search(SearchTool::Youtube) => "YouTube Search".to_string(),
        ToolKind::File(tool) => file_tool_name(*tool).to_string(),
        ToolKind::RunCode => "Run code".to_string(),
        ToolKind::Image(ImageTool::Gemini) => "Nano Banana Pro".to_string(),
        ToolKind::Image(ImageTool::Seedream) => "Seedream 4.5".to_string(),
        ToolKind::Image(ImageTool::QwenEdit) => "Qwen Image Edit".to_string(),
        ToolKind::Video(VideoTool::Wan25) => wan25_name(args, result).to_string(),
        ToolKind::Video(VideoTool::Grok) => grok_name(args, result).to_string(),
        ToolKind::Video(VideoTool::Upscaler) | ToolKind::Other(_) => tool_name.to_string(),
        ToolKind::Calculator => "Calculator".to_string(),
        ToolKind::LinkReader => "Link Reader".to_string(),
        ToolKind::YoutubeAnalyzer => "YouTube Analyzer".to_string(),
    }
}

fn file_tool_name(tool: FileTool) -> &'static str {
    match tool {
        FileTool::Read => "Read file",
        FileTool::Write => "Write file",
        FileTool::ApplyEdits => "Apply edits",
        FileTool::Delete => "Delete file",
        FileTool::Grep => "Search in file",
        FileTool::Info => "File info",
        FileTool::ListWorkspace => "List workspace",
    }
}

/// Heading for a search topic or Google engine.
pub fn topic_name(topic: &str) -> &'static str {
    match topic {
        "news" => "News Searches",
        "financial report" => "Financial Reports",
        "company" => "Company Searches",
        "research paper" => "Research Papers",
        "pdf" => "PDF Searches",
        "github" => "GitHub Searches",
        "personal site" => "Personal Sites",
        "linkedin profile" => "LinkedIn Profiles",
        "google" => "Google Searches",
        "google_images" => "Google Images",
        "google_videos" => "Google Videos",
        "twitter" => "X Searches",
        _ => "Advanced Search",
    }
}

/// Topic actually searched: the result's report first, then the arguments.
fn search_topic(args: &Value, result: Option<&Value>) -> Option<String> {
    result
        .and_then(|result| first_entry_str(result, "topic"))
        .or_else(|| first_str(args, "topics"))
        .or_else(|| non_empty_str(args, "topic"))
}

fn google_engine(args: &Value, result: Option<&Value>) -> String {
    result
        .and_then(|result| {
            first_entry_str(result, "engine").or_else(|| first_entry_str(result, "topic"))
        })
        .or_else(|| first_str(args, "engines"))
        .or_else(|| non_empty_str(args, "topic"))
        .or_else(|| non_empty_str(args, "engine"))
        .unwrap_or_else(|| DEFAULT_GOOGLE_ENGINE.to_string())
}

fn video_model(args: &Value, result: Option<&Value>) -> Option<String> {
    result
        .and_then(|result| non_empty_str(result, "model"))
        .or_else(|| non_empty_str(args, "model"))
}

fn wan25_name(args: &Value, result: Option<&Value>) -> &'static str {
    let image_to_video = result
        .and_then(|result| {
            result.get("isImageToVideo").and_then(Value::as_bool).or_else(|| {
                result
                    .get("videos")
                    .and_then(|videos| videos.get(0))
                    .and_then(|video| video.get("isImageToVideo"))
                    .and_then(Value::as_bool)
            })
        })
        .unwrap_or_else(|| video_model(args, result).as_deref() == Some("image-to-video"));
    if image_to_video {
        "Wan 2.5 Image to Video"
    } else {
        "Wan 2.5 Text to Video"
    }
}

fn grok_name(args: &Value, result: Option<&Value>) -> &'static str {
    let model = video_model(args, result);
    let flag = |key: &str, model_name: &str| {
        result
            .and_then(|result| result.get(key))
            .and_then(Value::as_bool)
            .unwrap_or(model.as_deref() == Some(model_name))
    };
    if flag("isVideoEdit", "video-edit") {
        "Grok Video to Video"
    } else if flag("isImageToVideo", "image-to-video") {
        "Grok Image to Video"
    } else {
        "Grok Text to Video"
    }
}

/// One-line description of what the call is doing, from its arguments.
fn summary(args: &Value) -> String {
    if let Some(queries) = args.get("queries").and_then(Value::as_array) {
        return queries
            .iter()
            .map(|query| format!("\"{}\"", value_text(query)))
            .collect::<Vec<_>>()
            .join(", ");
    }
    if let Some(query) = non_empty_str(args, "query") {
        return format!("\"{query}\"");
    }
    if let Some(expression) = non_empty_str(args, "expression") {
        return expression;
    }
    if let Some(urls) = args.get("urls").and_then(Value::as_array) {
        let hosts: Vec<String> = urls.iter().filter_map(Value::as_str).map(display_host).collect();
        return match hosts.as_slice() {
            [] => String::new(),
            [only] => only.clone(),
            [first, ..] => format!("{first} (+{} more)", urls.len() - 1),
        };
    }
    if let Some(url) = non_empty_str(args, "url") {
        return display_host(&url);
    }
    if let Some(prompt) = non_empty_str(args, "prompt") {
        return truncate_graphemes(&prompt, PROMPT_SUMMARY_GRAPHEMES, "...");
    }
    if let Some(path) = non_empty_str(args, "path") {
        return truncate_graphemes(&path, PATH_SUMMARY_GRAPHEMES, "…");
    }
    String::new()
}

fn panel_route(kind: &ToolKind, tool_name: &str, args: &Value, result: Option<&Value>) -> String {
    match kind {
        ToolKind::Search(SearchTool::Web | SearchTool::Multi) => {
            let topic = search_topic(args, result).unwrap_or_else(|| DEFAULT_SEARCH_TOPIC.to_string());
            format!("web-search:topic:{topic}")
        }
        ToolKind::Search(SearchTool::Google) => {
            format!("google-search:topic:{}", google_engine(args, result))
        }
        ToolKind::Search(SearchTool::Twitter) => "twitter_search".to_string(),
        ToolKind::Search(SearchTool::Youtube) => "youtube-search".to_string(),
        ToolKind::File(_) => format!("file-edit:{tool_name}"),
        ToolKind::RunCode => "run-code".to_string(),
        ToolKind::Image(ImageTool::Gemini) => "gemini-image".to_string(),
        ToolKind::Image(ImageTool::Seedream) => "seedream-image".to_string(),
        ToolKind::Image(ImageTool::QwenEdit) => "qwen-image".to_string(),
        ToolKind::Video(VideoTool::Wan25) => "wan25-video".to_string(),
        ToolKind::Video(VideoTool::Grok) => "grok-video".to_string(),
        ToolKind::Calculator => "calculator".to_string(),
        ToolKind::LinkReader => "link-reader".to_string(),
        ToolKind::YoutubeAnalyzer => "youtube-analyzer".to_string(),
        ToolKind::Video(VideoTool::Upscaler) | ToolKind::Other(_) => tool_name.to_string(),
    }
}

fn item_identifier(kind: &ToolKind, args: &Value) -> Option<String> {
    match kind {
        ToolKind::Search(SearchTool::Youtube) => None,
        ToolKind::Search(_) => non_empty_str(args, "query").or_else(|| first_str(args, "queries")),
        ToolKind::LinkReader => non_empty_str(args, "url"),
        ToolKind::YoutubeAnalyzer => first_str(args, "urls"),
        ToolKind::Calculator => non_empty_str(args, "expression"),
        ToolKind::File(FileTool::ListWorkspace) => None,
        ToolKind::File(_) => non_empty_str(args, "path"),
        _ => None,
    }
}

fn first_entry_str(result: &Value, key: &str) -> Option<String> {
    search_entries(result)
        .first()
        .and_then(|entry| non_empty_str(entry, key))
}

fn first_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(Value::as_str)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
}

fn non_empty_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(text)) => !text.is_empty(),
        Some(_) => true,
    }
}
