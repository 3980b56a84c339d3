use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join("architecture").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn trestle() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("trestle"));
    cmd.current_dir(repo_root());
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is JSON")
}

#[test]
fn validate_summarizes_the_model() {
    let value = stdout_json(trestle().args([
        "validate",
        fixture("basic.json").to_string_lossy().as_ref(),
    ]));
    assert_eq!(value["nodes"], 4);
    assert_eq!(value["relationships"], 3);
    assert_eq!(value["containers"], serde_json::json!(["a"]));
}

#[test]
fn validate_reads_stdin() {
    let text = fs::read_to_string(fixture("basic.json")).expect("read fixture");
    assert_cmd::Command::from_std(trestle())
        .args(["validate", "-"])
        .write_stdin(text)
        .assert()
        .success();
}

#[test]
fn invalid_models_fail() {
    assert_cmd::Command::from_std(trestle())
        .arg("validate")
        .write_stdin(r#"{ "nodes": [], "relationships": [ { "unique-id": "r", "relationship-type": { "connects": { "source": "x", "target": "y" } } } ] }"#)
        .assert()
        .failure()
        .code(1);
}

#[test]
fn unknown_flags_print_usage() {
    trestle()
        .args(["layout", "--bogus"])
        .assert()
        .failure()
        .code(2);
    trestle().arg("apply").assert().failure().code(2);
}

#[test]
fn layout_places_every_node_and_writes_the_record() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("basic.layout.json");

    let value = stdout_json(trestle().args([
        "layout",
        "--out",
        out.to_string_lossy().as_ref(),
        fixture("basic.json").to_string_lossy().as_ref(),
    ]));
    assert_eq!(value["fallback"], false);
    let nodes = value["canvas"]["nodes"].as_array().expect("nodes");
    assert_eq!(nodes.len(), 4);
    for node in nodes {
        assert!(node["absoluteX"].as_f64().is_some_and(f64::is_finite));
        assert!(node["absoluteY"].as_f64().is_some_and(f64::is_finite));
    }

    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).expect("layout written")).expect("JSON");
    assert_eq!(record["version"], 1);
    assert_eq!(record["diagramType"], "architecture");
    for id in ["a", "b", "c", "u"] {
        assert!(record["nodes"][id]["x"].is_number(), "{id} missing from record");
    }
}

#[test]
fn saved_layout_pins_positions() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let saved = tmp.path().join("saved.json");
    fs::write(
        &saved,
        r#"{ "version": 1, "nodes": { "c": { "x": 900, "y": 700, "width": 140, "height": 90 } } }"#,
    )
    .expect("write layout");

    let value = stdout_json(trestle().args([
        "layout",
        "--layout",
        saved.to_string_lossy().as_ref(),
        fixture("basic.json").to_string_lossy().as_ref(),
    ]));
    let c = value["canvas"]["nodes"]
        .as_array()
        .expect("nodes")
        .iter()
        .find(|n| n["id"] == "c")
        .expect("node c");
    assert_eq!(c["absoluteX"], 900.0);
    assert_eq!(c["absoluteY"], 700.0);
}

#[test]
fn flow_diagrams_are_recorded_as_flow() {
    let value = stdout_json(trestle().args([
        "layout",
        "--diagram",
        "flow",
        fixture("basic.json").to_string_lossy().as_ref(),
    ]));
    assert_eq!(value["layout"]["diagramType"], "flow");
}

#[test]
fn apply_runs_an_edit_script() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("next.json");

    let value = stdout_json(trestle().args([
        "apply",
        "--edits",
        fixture("edits.json").to_string_lossy().as_ref(),
        "--out",
        out.to_string_lossy().as_ref(),
        fixture("basic.json").to_string_lossy().as_ref(),
    ]));
    let ops: Vec<&str> = value["patches"]
        .as_array()
        .expect("patches")
        .iter()
        .filter_map(|p| p["op"].as_str())
        .collect();
    assert_eq!(ops, vec!["addRelationship", "updateField", "removeRelationship"]);

    let next = fs::read_to_string(&out).expect("model written");
    let next: serde_json::Value = serde_json::from_str(&next).expect("JSON");
    assert_eq!(next["nodes"][1]["name"], "Checkout API");
    assert!(
        next["relationships"]
            .as_array()
            .expect("relationships")
            .iter()
            .all(|r| r["unique-id"] != "u-b")
    );
}

#[test]
fn handles_prints_routed_edges() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("canvas.json");
    fs::write(&config, r#"{ "handles": { "maxEdgesPerSide": 1 } }"#).expect("write config");

    let value = stdout_json(trestle().args([
        "handles",
        "--config",
        config.to_string_lossy().as_ref(),
        fixture("basic.json").to_string_lossy().as_ref(),
    ]));
    let edges = value.as_array().expect("edges");
    assert_eq!(edges.len(), 2);
    for edge in edges {
        assert!(edge["sourceHandle"].as_str().is_some_and(|h| h.ends_with("-src")));
        assert!(edge["targetHandle"].as_str().is_some_and(|h| h.ends_with("-tgt")));
    }
}
