use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn cli_fixture(file: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(file)
}

#[test]
fn cli_set_then_get_roundtrips_through_store_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store.json");
    let store = store.to_str().unwrap();

    let mut cmd = cargo_bin_cmd!("nodeaddr");
    cmd.args([
        "set",
        "--store",
        store,
        "job-1",
        "root.user_input#characters.lead",
        r#"{"character_name":{"value":"Ada"}}"#,
    ]);
    cmd.assert().success();

    let mut cmd = cargo_bin_cmd!("nodeaddr");
    cmd.args([
        "get",
        "--store",
        store,
        "job-1",
        "root.user_input#characters.lead.character_name.value",
    ]);
    cmd.assert().success().stdout("\"Ada\"\n");

    let text = std::fs::read_to_string(store).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        saved["job-1"]["root.user_input"]["characters"]["lead"]["character_name"]["value"],
        "Ada"
    );
}

#[test]
fn cli_get_missing_node_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store.json");

    let mut cmd = cargo_bin_cmd!("nodeaddr");
    cmd.args([
        "get",
        "--store",
        store.to_str().unwrap(),
        "job-1",
        "root.nowhere#a",
    ]);

    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Node not found"));
}

#[test]
fn cli_get_missing_key_in_existing_node_prints_null() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store.json");
    let seeded = r#"{"job-1":{"root.user_input":{"notes":"x"}}}"#;
    std::fs::write(&store, seeded).unwrap();

    let mut cmd = cargo_bin_cmd!("nodeaddr");
    cmd.args([
        "get",
        "--store",
        store.to_str().unwrap(),
        "job-1",
        "root.user_input#absent",
    ]);

    cmd.assert().success().stdout("null\n");
}

#[test]
fn cli_set_rejects_bad_address_with_exit_2() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store.json");

    let mut cmd = cargo_bin_cmd!("nodeaddr");
    cmd.args([
        "set",
        "--store",
        store.to_str().unwrap(),
        "job-1",
        "a#b#c",
        "1",
    ]);

    cmd.assert().failure().code(2);
    assert!(!store.exists());
}

#[test]
fn cli_set_rejects_invalid_json_value_with_exit_1() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store.json");

    let mut cmd = cargo_bin_cmd!("nodeaddr");
    cmd.args([
        "set",
        "--store",
        store.to_str().unwrap(),
        "job-1",
        "root.a#b",
        "{not json",
    ]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("value is not valid JSON"));
}

#[test]
fn cli_push_writes_interpolated_payload() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store.json");
    let payload = cli_fixture("payload.json");
    let context = cli_fixture("context.json");

    let mut cmd = cargo_bin_cmd!("nodeaddr");
    cmd.args([
        "push",
        "--store",
        store.to_str().unwrap(),
        "job-9",
        "root.outputs#scene",
        payload.to_str().unwrap(),
        "--context",
        context.to_str().unwrap(),
    ]);
    cmd.assert().success();

    let mut cmd = cargo_bin_cmd!("nodeaddr");
    cmd.args([
        "get",
        "--store",
        store.to_str().unwrap(),
        "job-9",
        "root.outputs#scene",
    ]);

    let out = cmd.assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["title"], "Harbour at dawn");
    assert_eq!(v["owner"], "job-9");
}

#[test]
fn cli_custom_not_found_marker_turns_missing_node_into_remote_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store.json");

    let mut cmd = cargo_bin_cmd!("nodeaddr");
    cmd.args([
        "get",
        "--store",
        store.to_str().unwrap(),
        "--not-found-marker",
        "no such row",
        "job-1",
        "root.nowhere#a",
    ]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "json_resolve_by_path(job-1, root.nowhere#a)",
        ));
}
