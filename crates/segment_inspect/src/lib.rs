//! Offline inspection of recorded message snapshots.
//!
//! A snapshot file holds one wire message, an array of messages, or an object
//! `{ "messages": [...] | "message": {...}, "maps": {...} }`. Rendering uses
//! the same conversation-wide maps a live client would build, with the
//! snapshot's `maps` layered on top.

pub mod error;
pub mod snapshot;
pub mod stream;

pub use error::InspectError;
pub use snapshot::{load_snapshot, render_snapshot, Snapshot};
pub use stream::{replay, replay_snapshot, MessageReplay, StreamFrame};
