mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn workspace_bundle_roundtrip_restores_records() {
    let workspace = temp_dir("conductd-backup");
    let bundle = workspace.join("out").join("backup.zip");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    request_ok(&mut stdin, &mut reader, "2", "classes.save", json!({ "name": "M.4/1" }));

    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "backup.exportWorkspaceBundle",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(exported["entryCount"], 2);
    assert!(bundle.is_file());

    request_ok(&mut stdin, &mut reader, "4", "classes.save", json!({ "name": "M.4/2" }));
    request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "backup.importWorkspaceBundle",
        json!({ "inPath": bundle.to_string_lossy() }),
    );
    let classes = request_ok(&mut stdin, &mut reader, "6", "classes.list", json!({}));
    assert_eq!(classes["classes"].as_array().map(|c| c.len()), Some(1));
    assert_eq!(classes["classes"][0]["name"], "M.4/1");

    let missing = request_err(
        &mut stdin,
        &mut reader,
        "7",
        "backup.importWorkspaceBundle",
        json!({ "inPath": workspace.join("nope.zip").to_string_lossy() }),
    );
    assert_eq!(missing, "not_found");
}
