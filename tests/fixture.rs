#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use segment_view::{decode_message, Message, PlaceholderMaps};
use serde_json::Value;

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("failed to read fixture {name}: {err}"))
}

pub fn read_json(name: &str) -> Value {
    serde_json::from_str(&read_fixture(name))
        .unwrap_or_else(|err| panic!("fixture {name} is not valid JSON: {err}"))
}

/// Decodes a `{ messages, maps }` fixture.
pub fn read_conversation(name: &str) -> (Vec<Message>, PlaceholderMaps) {
    let value = read_json(name);
    let messages = value["messages"]
        .as_array()
        .unwrap_or_else(|| panic!("fixture {name} has no messages array"))
        .iter()
        .map(|message| {
            decode_message(message)
                .unwrap_or_else(|err| panic!("fixture {name} has an invalid message: {err}"))
        })
        .collect();
    let maps = match value.get("maps") {
        Some(maps) => serde_json::from_value(maps.clone())
            .unwrap_or_else(|err| panic!("fixture {name} has invalid maps: {err}")),
        None => PlaceholderMaps::default(),
    };
    (messages, maps)
}
