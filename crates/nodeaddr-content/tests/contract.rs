mod util;

use nodeaddr_content::{
    ContentDocument, ContentKind, check_content, parse_content, validate_content,
};
use serde_json::json;
use util::fixture_json;

fn section(extra: serde_json::Value) -> serde_json::Value {
    let mut s = json!({ "kind": "SectionItem", "id": "scene", "label": "Scene" });
    if let (Some(obj), Some(more)) = (s.as_object_mut(), extra.as_object()) {
        obj.extend(more.clone());
    }
    json!({ "kind": "FormContent", "version": "v2-items", "items": [s] })
}

#[test]
fn fixtures_pass_their_contracts() {
    for (kind, name) in [
        (ContentKind::Form, "form.scene.json"),
        (ContentKind::Media, "media.poster.json"),
        (ContentKind::Group, "group.episodes.json"),
    ] {
        assert!(check_content(kind, &fixture_json(name)).ok, "{name}");
    }
}

#[test]
fn section_needs_exactly_one_of_children_or_collection() {
    let both = section(json!({ "children": [], "collection": {} }));
    let neither = section(json!({}));
    let children = section(json!({ "children": [] }));
    let collection = section(json!({ "collection": { "kind": "CollectionNode" } }));

    let check = check_content(ContentKind::Form, &both);
    assert!(!check.ok);
    assert_eq!(
        check.why.as_deref(),
        Some("items.0: exactly one of children or collection must be set")
    );
    assert!(!check_content(ContentKind::Form, &neither).ok);
    assert!(check_content(ContentKind::Form, &children).ok);
    assert!(check_content(ContentKind::Form, &collection).ok);
}

#[test]
fn failure_names_the_dotted_path() {
    let doc = json!({
        "kind": "FormContent",
        "version": "v2-items",
        "items": [
            { "kind": "FieldItem", "ref": "title" },
            { "kind": "SectionItem", "id": "scene", "label": "Scene",
              "children": [{ "kind": "FieldItem", "ref": "" }] }
        ]
    });
    let err = validate_content(ContentKind::Form, &doc).unwrap_err();
    assert_eq!(err.path, "items.1.children.0.ref");
    assert_eq!(err.why(), "items.1.children.0.ref: must not be empty");
}

#[test]
fn unknown_form_version_is_rejected() {
    let doc = json!({ "kind": "FormContent", "version": "v1", "items": [] });
    let check = check_content(ContentKind::Form, &doc);
    assert_eq!(
        check.why.as_deref(),
        Some("version: unsupported form content version 'v1' (expected v2-items)")
    );
}

#[test]
fn wrong_kind_tag_is_rejected() {
    let check = check_content(ContentKind::Media, &fixture_json("group.episodes.json"));
    assert_eq!(
        check.why.as_deref(),
        Some("kind: expected 'MediaContent', got 'GroupContent'")
    );
}

#[test]
fn instances_require_a_repeatable_item() {
    let doc = json!({
        "kind": "FormContent",
        "version": "v2-items",
        "items": [{ "kind": "FieldItem", "ref": "title",
                    "instances": [{ "item_instance_id": 2 }] }]
    });
    let err = validate_content(ContentKind::Form, &doc).unwrap_err();
    assert_eq!(err.path, "items.0.instances");
}

#[test]
fn instance_ids_start_at_two_and_are_unique() {
    let with_ids = |ids: &[u32]| {
        let instances: Vec<_> = ids
            .iter()
            .map(|id| json!({ "item_instance_id": id }))
            .collect();
        json!({
            "kind": "FormContent",
            "version": "v2-items",
            "items": [{ "kind": "FieldItem", "ref": "tags", "repeatable": {},
                        "instances": instances }]
        })
    };

    assert!(check_content(ContentKind::Form, &with_ids(&[2, 3])).ok);
    assert!(!check_content(ContentKind::Form, &with_ids(&[1])).ok);
    let dup = validate_content(ContentKind::Form, &with_ids(&[2, 2]))
        .unwrap_err();
    assert_eq!(dup.message, "duplicate instance id 2");
}

#[test]
fn occurrences_respect_repeatable_max() {
    let doc = json!({
        "kind": "FormContent",
        "version": "v2-items",
        "items": [{ "kind": "FieldItem", "ref": "tags", "repeatable": { "max": 2 },
                    "instances": [{ "item_instance_id": 2 }, { "item_instance_id": 3 }] }]
    });
    let err = validate_content(ContentKind::Form, &doc).unwrap_err();
    assert_eq!(err.message, "3 occurrences exceed repeatable max 2");
}

#[test]
fn subsections_only_hold_sections() {
    let doc = section(json!({
        "children": [],
        "subsections": [{ "kind": "FieldItem", "ref": "title" }]
    }));
    let err = validate_content(ContentKind::Form, &doc).unwrap_err();
    assert_eq!(err.path, "items.0.subsections.0.kind");
}

#[test]
fn media_selection_must_point_at_a_version() {
    let mut doc = fixture_json("media.poster.json");
    doc["selected_version_idx"] = json!(5);
    let err = validate_content(ContentKind::Media, &doc).unwrap_err();
    assert_eq!(err.path, "selected_version_idx");

    let empty = json!({ "kind": "MediaContent", "path": "p", "type": "video", "versions": [] });
    assert!(check_content(ContentKind::Media, &empty).ok);
}

#[test]
fn unknown_media_type_is_rejected() {
    let mut doc = fixture_json("media.poster.json");
    doc["type"] = json!("hologram");
    assert!(!check_content(ContentKind::Media, &doc).ok);
}

#[test]
fn group_children_are_strings() {
    let doc = json!({ "kind": "GroupContent", "path": "g", "children": ["a", 3] });
    let err = validate_content(ContentKind::Group, &doc).unwrap_err();
    assert_eq!(err.why(), "children.1: expected a string");
}

#[test]
fn non_object_root_fails_at_root() {
    let check = check_content(ContentKind::Form, &json!([1, 2]));
    assert_eq!(check.why.as_deref(), Some("(root): expected an object"));
}

#[test]
fn check_serializes_as_ok_why() {
    let check = check_content(ContentKind::Group, &fixture_json("group.episodes.json"));
    let ok = serde_json::to_value(check).unwrap();
    assert_eq!(ok, json!({ "ok": true }));
}

#[test]
fn parse_yields_typed_documents() {
    let doc = parse_content(ContentKind::Media, &fixture_json("media.poster.json"))
        .unwrap();
    let ContentDocument::MediaContent(media) = doc else {
        panic!("expected media content");
    };
    assert_eq!(media.versions.len(), 2);
    assert_eq!(
        media.selected_version().map(|v| v.url.as_str()),
        Some("https://cdn.example.test/poster-1.png")
    );
    assert!(!media.needs_generation());
}

#[test]
fn content_kind_parses_short_and_tag_names() {
    assert_eq!("form".parse::<ContentKind>(), Ok(ContentKind::Form));
    assert_eq!(
        "GroupContent".parse::<ContentKind>(),
        Ok(ContentKind::Group)
    );
    assert!("page".parse::<ContentKind>().is_err());
}
