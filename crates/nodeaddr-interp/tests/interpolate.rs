use serde_json::{Value, json};

use nodeaddr_interp::{
    InterpolationContext, extract_tokens, get_nested_value, has_interpolation_tokens,
    interpolate_json, interpolate_string, merge_job, unresolved_tokens,
};

#[test]
fn substitutes_job_and_node_tokens() {
    let ctx = json!({ "job": { "id": "J1" }, "node": { "path": "root.x" } });
    let template = json!({ "a": "{{job.id}}-{{node.path}}", "b": 3 });

    assert_eq!(
        interpolate_json(&template, &ctx),
        json!({ "a": "J1-root.x", "b": 3 })
    );
}

#[test]
fn unresolved_token_is_preserved() {
    assert_eq!(
        interpolate_string("val={{missing.key}}", &json!({})),
        "val={{missing.key}}"
    );
}

#[test]
fn whitespace_inside_braces_is_trimmed() {
    let ctx = json!({ "job": { "id": "J9" } });
    assert_eq!(interpolate_string("id: {{  job.id }}", &ctx), "id: J9");
}

#[test]
fn non_string_values_render_as_json_text() {
    let ctx = json!({
        "instance": { "index": 2 },
        "flags": { "on": true, "none": null },
        "tags": ["a", "b"],
        "obj": { "k": 1 }
    });

    assert_eq!(interpolate_string("#{{instance.index}}", &ctx), "#2");
    assert_eq!(interpolate_string("{{flags.on}}", &ctx), "true");
    assert_eq!(interpolate_string("{{flags.none}}", &ctx), "null");
    assert_eq!(interpolate_string("{{tags}}", &ctx), r#"["a","b"]"#);
    assert_eq!(interpolate_string("{{obj}}", &ctx), r#"{"k":1}"#);
}

#[test]
fn nested_arrays_and_objects_are_walked() {
    let ctx = json!({ "node": { "id": "n1" } });
    let payload = json!({
        "list": ["{{node.id}}", 1, false, null, { "deep": ["x{{node.id}}"] }]
    });

    assert_eq!(
        interpolate_json(&payload, &ctx),
        json!({ "list": ["n1", 1, false, null, { "deep": ["xn1"] }] })
    );
}

#[test]
fn keys_are_not_interpolated() {
    let ctx = json!({ "job": { "id": "J1" } });
    let payload = json!({ "{{job.id}}": "{{job.id}}" });
    assert_eq!(
        interpolate_json(&payload, &ctx),
        json!({ "{{job.id}}": "J1" })
    );
}

#[test]
fn nested_lookup_never_panics() {
    let ctx = json!({ "a": { "b": null, "list": [10, 20] }, "s": "text" });

    assert_eq!(get_nested_value(&ctx, "a.list.1"), Some(&json!(20)));
    assert_eq!(get_nested_value(&ctx, "a.b"), Some(&Value::Null));
    assert_eq!(get_nested_value(&ctx, "a.b.c"), None);
    assert_eq!(get_nested_value(&ctx, "a.list.9"), None);
    assert_eq!(get_nested_value(&ctx, "s.len"), None);
    assert_eq!(get_nested_value(&ctx, "missing"), None);
}

#[test]
fn token_introspection() {
    let payload = json!({
        "title": "{{ job.id }} / {{node.path}}",
        "more": ["{{job.id}}", "{{custom.thing}}"],
        "n": 4
    });

    assert!(has_interpolation_tokens(&payload));
    // Object keys iterate in sorted order: "more" before "title".
    assert_eq!(
        extract_tokens(&payload),
        vec!["job.id", "custom.thing", "node.path"]
    );

    let ctx = InterpolationContext::new()
        .job("J1")
        .node("n1", "root.x")
        .build();
    assert_eq!(unresolved_tokens(&payload, &ctx), vec!["custom.thing"]);

    let out = interpolate_json(&payload, &ctx);
    assert!(has_interpolation_tokens(&out));
    assert_eq!(extract_tokens(&out), vec!["custom.thing"]);
}

#[test]
fn plain_payload_has_no_tokens() {
    let plain = json!({ "a": "{ not a token }", "b": [1, 2] });
    assert!(!has_interpolation_tokens(&plain));
    assert!(extract_tokens(&json!("{{}")).is_empty());
}

#[test]
fn context_builder_shapes_namespaces() {
    let ctx = InterpolationContext::new()
        .job("J1")
        .node("n1", "root.plan")
        .instance("i2", "root.plan.scene_2", 1)
        .custom("tone", json!("dark"))
        .build();

    assert_eq!(
        ctx,
        json!({
            "job": { "id": "J1" },
            "node": { "id": "n1", "path": "root.plan" },
            "instance": { "id": "i2", "path": "root.plan.scene_2", "index": 1 },
            "tone": "dark"
        })
    );
}

#[test]
fn merge_job_overrides_caller_job() {
    let ctx = json!({ "job": { "id": "spoofed", "extra": 1 }, "tone": "dark" });
    assert_eq!(
        merge_job(&ctx, "J1"),
        json!({ "job": { "id": "J1" }, "tone": "dark" })
    );
    assert_eq!(
        merge_job(&Value::Null, "J2"),
        json!({ "job": { "id": "J2" } })
    );
}
