//! Environment configuration.

use std::env;

use crate::core::maps::ImageOutput;
use crate::resolve::{ResolveOptions, UnresolvedPolicy};
use crate::segment::classify::ClassifyOptions;
use crate::view::ViewOptions;

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub image_output: ImageOutput,
    pub keep_unresolved: bool,
    pub suppress_repeats: bool,
    pub resolve_in_code: bool,
    pub log_filter: Option<String>,
    pub log_file: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        let image_output = env_string_opt("SEGMENT_VIEW_IMAGE_OUTPUT")
            .and_then(|value| {
                let parsed = ImageOutput::parse(&value);
                if parsed.is_none() {
                    tracing::warn!(value = %value, "ignoring unknown SEGMENT_VIEW_IMAGE_OUTPUT");
                }
                parsed
            })
            .unwrap_or_default();

        Self {
            image_output,
            keep_unresolved: env_flag("SEGMENT_VIEW_KEEP_UNRESOLVED"),
            suppress_repeats: env_flag("SEGMENT_VIEW_SUPPRESS_REPEATS"),
            resolve_in_code: env_flag("SEGMENT_VIEW_RESOLVE_IN_CODE"),
            log_filter: env_string_opt("SEGMENT_VIEW_LOG"),
            log_file: env_string_opt("SEGMENT_VIEW_LOG_FILE"),
        }
    }
}

impl From<&EnvConfig> for ViewOptions {
    fn from(config: &EnvConfig) -> Self {
        Self {
            resolve: ResolveOptions {
                image_output: config.image_output,
                unresolved: if config.keep_unresolved {
                    UnresolvedPolicy::Keep
                } else {
                    UnresolvedPolicy::Remove
                },
                resolve_in_code: config.resolve_in_code,
            },
            classify: ClassifyOptions {
                suppress_repeats: config.suppress_repeats,
            },
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
