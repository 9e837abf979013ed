mod fixture;

use pretty_assertions::assert_eq;
use segment_view::{
    classify, expand, is_prefix_consistent, resolve, MediaIndex, Part, PlaceholderMaps,
    ResolveOptions, Segment, ToolCall, UnresolvedPolicy,
};
use serde_json::json;

fn maps() -> PlaceholderMaps {
    PlaceholderMaps::new()
        .with_image("x", "u1")
        .with_image("y", "u2")
        .with_image("z", "u3")
        .with_link("a", "http://s.com")
        .with_link("b", "http://s.com")
        .with_link("c", "http://t.com")
        .with_emission_order(["z", "y", "x"])
}

const SAMPLES: [&str; 8] = [
    "[IMAGE_ID:x] [IMAGE_ID:y]",
    "[LINK_ID:a]\n[LINK_ID:b]",
    "see [LINK_ID:a] [LINK_ID:c] [LINK_ID:b] and [IMAGE_ID:missing].",
    "[IMAGE_ID:y] [IMAGE_ID:nope] [IMAGE_ID:x] [IMAGE_ID:z]",
    "```\n[IMAGE_ID:x]\n```\n[IMAGE_ID:x]",
    "LINK_ID:a then LINK_ID:c",
    "no tags here",
    "[VIDEO_ID:gone] trailing",
];

#[test]
fn scenario_emission_order_reorders_adjacent_images() {
    let maps = PlaceholderMaps::new()
        .with_image("x", "u1")
        .with_image("y", "u2")
        .with_emission_order(["y", "x"]);

    let resolved = resolve("[IMAGE_ID:x] [IMAGE_ID:y]", &maps, &ResolveOptions::default());

    let u2 = resolved.find("u2").expect("u2 rendered");
    let u1 = resolved.find("u1").expect("u1 rendered");
    assert!(u2 < u1);
}

#[test]
fn scenario_adjacent_duplicate_links_render_once() {
    let resolved = resolve("[LINK_ID:a]\n[LINK_ID:b]", &maps(), &ResolveOptions::default());
    assert_eq!(resolved.matches("http://s.com").count(), 1);
}

#[test]
fn scenario_multi_query_expands_to_matching_siblings() {
    let parts = vec![
        Part::tool_call("t1", "web_search", json!({"queries": ["q1", "q2"]})),
        Part::tool_result("t1", json!({"searches": [{"query": "q1"}, {"query": "q2"}]})),
    ];
    let classification = classify(&parts);
    let Segment::Tool(tool) = &classification.segments[0] else {
        panic!("expected a tool segment");
    };

    let units = expand(&tool.call, tool.result.as_ref());

    assert_eq!(units.len(), 2);
    assert_eq!(units[0].call.args["queries"], json!(["q1"]));
    assert_eq!(units[1].call.args["queries"], json!(["q2"]));
    assert_eq!(units[0].result, Some(json!({"searches": [{"query": "q1"}]})));
    assert_eq!(units[1].result, Some(json!({"searches": [{"query": "q2"}]})));
}

#[test]
fn scenario_text_collapses_around_tool_call() {
    let parts = vec![
        Part::text("a"),
        Part::text("b"),
        Part::tool_call("t1", "read_file", json!({"path": "x"})),
        Part::text("c"),
    ];

    let segments = classify(&parts).segments;

    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0], Segment::Text { content: "ab".to_string() });
    assert!(matches!(&segments[1], Segment::Tool(tool) if tool.call.tool_call_id == "t1"));
    assert_eq!(segments[2], Segment::Text { content: "c".to_string() });
}

#[test]
fn scenario_missing_image_never_leaks_its_tag() {
    let resolved = resolve(
        "[IMAGE_ID:missing]",
        &PlaceholderMaps::new(),
        &ResolveOptions::default(),
    );
    assert_eq!(resolved, "");
}

#[test]
fn resolving_twice_changes_nothing() {
    let maps = maps();
    let options = ResolveOptions::default();
    for sample in SAMPLES {
        let once = resolve(sample, &maps, &options);
        assert_eq!(resolve(&once, &maps, &options), once, "sample: {sample:?}");
    }
}

#[test]
fn removal_policy_leaves_no_media_tags_in_prose() {
    let maps = maps();
    for sample in SAMPLES.iter().filter(|sample| !sample.contains("```")) {
        let resolved = resolve(sample, &maps, &ResolveOptions::default());
        assert!(!resolved.contains("_ID:"), "sample {sample:?} left {resolved:?}");
    }
}

#[test]
fn keep_policy_leaves_only_unresolved_tags() {
    let options = ResolveOptions {
        unresolved: UnresolvedPolicy::Keep,
        ..ResolveOptions::default()
    };
    let resolved = resolve(SAMPLES[3], &maps(), &options);
    assert!(resolved.contains("[IMAGE_ID:nope]"));
    assert!(!resolved.contains("[IMAGE_ID:x]"));
}

#[test]
fn link_runs_never_repeat_a_url() {
    let maps = maps();
    let resolved = resolve(
        "[LINK_ID:a] [LINK_ID:c] [LINK_ID:b] [LINK_ID:c]",
        &maps,
        &ResolveOptions::default(),
    );
    assert_eq!(resolved.matches("http://s.com").count(), 1);
    assert_eq!(resolved.matches("http://t.com").count(), 1);
}

#[test]
fn image_runs_follow_emission_rank() {
    let resolved = resolve(SAMPLES[3], &maps(), &ResolveOptions::default());
    let positions: Vec<usize> = ["u3", "u2", "u1"]
        .iter()
        .map(|url| resolved.find(url).expect("image rendered"))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{resolved:?}");
}

#[test]
fn separated_images_keep_their_written_order() {
    let resolved = resolve(
        "[IMAGE_ID:x] then [IMAGE_ID:z]",
        &maps(),
        &ResolveOptions::default(),
    );
    assert_eq!(resolved, "![](u1) then ![](u3)");
}

#[test]
fn every_streamed_prefix_extends_the_previous_one() {
    let (messages, _) = fixture::read_conversation("conversation.json");
    for message in &messages {
        let parts = message.parts();
        let mut previous = classify(&[]).segments;
        for received in 1..=parts.len() {
            let current = classify(&parts[..received]).segments;
            assert!(
                is_prefix_consistent(&previous, &current),
                "message {} rewrote segments at part {received}",
                message.id
            );
            previous = current;
        }
    }
}

#[test]
fn result_before_call_is_filled_in_by_the_late_call() {
    let parts = vec![
        Part::tool_result("t1", json!({"searches": []})),
        Part::tool_call("t1", "web_search", json!({"query": "late"})),
    ];

    let early = classify(&parts[..1]).segments;
    let late = classify(&parts).segments;

    assert!(is_prefix_consistent(&early, &late));
    assert_eq!(late.len(), 1);
    assert!(matches!(
        &late[0],
        Segment::Tool(tool) if tool.call == ToolCall::new("t1", "web_search", json!({"query": "late"}))
    ));
}

#[test]
fn derived_maps_are_reproducible() {
    let (messages, _) = fixture::read_conversation("conversation.json");
    assert_eq!(
        MediaIndex::from_messages(&messages),
        MediaIndex::from_messages(&messages)
    );
}

#[test]
fn known_emission_order_wins_over_text_order() {
    let maps = PlaceholderMaps::new()
        .with_image("a", "https://i/a.png")
        .with_image("b", "https://i/b.png")
        .with_image("c", "https://i/c.png")
        .with_emission_order(["b", "a", "c"]);

    let resolved = resolve(
        "[IMAGE_ID:a]\n[IMAGE_ID:b]\n[IMAGE_ID:c]",
        &maps,
        &ResolveOptions::default(),
    );

    assert_eq!(
        resolved,
        "![](https://i/b.png)\n![](https://i/a.png)\n![](https://i/c.png)"
    );
}
