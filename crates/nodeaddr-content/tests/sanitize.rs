mod util;

use nodeaddr_content::sanitize::{has_runtime_state, strip_form};
use nodeaddr_content::{ContentKind, check_content, sanitize_for_library};
use serde_json::json;
use util::fixture_json;

#[test]
fn sanitize_strips_instances_at_every_depth() {
    let doc = fixture_json("form.scene.json");
    assert!(has_runtime_state(&doc));

    let clean = sanitize_for_library(ContentKind::Form, &doc)
        .expect("sanitized form is valid");
    assert!(!has_runtime_state(&clean));
    assert!(check_content(ContentKind::Form, &clean).ok);

    // Definitions and values survive; only the extra occurrences go.
    assert_eq!(clean["items"][1]["value"], json!(["intro"]));
    assert_eq!(
        clean["items"][2]["subsections"][0]["children"][0]["ref"],
        "lens"
    );
    assert_eq!(
        clean["items"][3]["collection"]["node_ids"],
        json!(["char_a", "char_b"])
    );
}

#[test]
fn instance_ids_on_items_are_removed() {
    let doc = json!({
        "kind": "FormContent",
        "version": "v2-items",
        "items": [
            { "kind": "FieldItem", "ref": "title", "item_instance_id": 1 },
            { "kind": "SectionItem", "id": "scene", "label": "Scene", "section_instance_id": 1,
              "children": [{ "kind": "FieldItem", "ref": "mood", "item_instance_id": 1 }] }
        ]
    });
    let clean = strip_form(&doc);
    assert_eq!(
        clean["items"],
        json!([
            { "kind": "FieldItem", "ref": "title" },
            { "kind": "SectionItem", "id": "scene", "label": "Scene",
              "children": [{ "kind": "FieldItem", "ref": "mood" }] }
        ])
    );
}

#[test]
fn sanitize_revalidates_the_result() {
    let doc = json!({
        "kind": "FormContent",
        "version": "v2-items",
        "items": [{ "kind": "SectionItem", "id": "scene", "label": "Scene",
                    "children": [], "collection": {} }]
    });
    let err = sanitize_for_library(ContentKind::Form, &doc).unwrap_err();
    assert_eq!(
        err.why(),
        "items.0: exactly one of children or collection must be set"
    );
}

#[test]
fn media_and_group_pass_through() {
    let media = fixture_json("media.poster.json");
    assert_eq!(
        sanitize_for_library(ContentKind::Media, &media).unwrap(),
        media
    );

    let group = fixture_json("group.episodes.json");
    assert_eq!(
        sanitize_for_library(ContentKind::Group, &group).unwrap(),
        group
    );
}

#[test]
fn value_payloads_named_like_runtime_keys_are_untouched() {
    let doc = json!({
        "kind": "FormContent",
        "version": "v2-items",
        "items": [{ "kind": "FieldItem", "ref": "notes",
                    "value": { "instances": ["kept"] } }]
    });
    let clean = sanitize_for_library(ContentKind::Form, &doc).unwrap();
    assert_eq!(clean["items"][0]["value"], json!({ "instances": ["kept"] }));
}
