//! Text helpers (fence splitting, placeholder scanning, grapheme-safe truncation).
//!
//! These helpers are pure (string in/string out) and live under `core` so the
//! resolver and the descriptors can depend on them without importing anything
//! from the segment layer.

pub mod fence;
pub mod placeholder;
pub mod utils;
