mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, str_field, temp_dir};

#[test]
fn class_with_students_cannot_be_deleted_and_renames_cascade() {
    let workspace = temp_dir("conductd-classes-delete");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let class = request_ok(&mut stdin, &mut reader, "2", "classes.save", json!({ "name": "M.1/1" }));
    let class_id = str_field(&class, "/class/id");
    let empty = request_ok(&mut stdin, &mut reader, "3", "classes.save", json!({ "name": "M.1/2" }));
    let dup = request_err(&mut stdin, &mut reader, "4", "classes.save", json!({ "name": "m.1/1" }));
    assert_eq!(dup, "duplicate");

    let unknown = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "students.save",
        json!({ "studentCode": "S1", "name": "Ann", "class": "M.6/6" }),
    );
    assert_eq!(unknown, "unknown_reference");
    request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "students.save",
        json!({ "studentCode": "S1", "name": "Ann", "class": "M.1/1" }),
    );

    let blocked = request_err(&mut stdin, &mut reader, "7", "classes.delete", json!({ "id": class_id }));
    assert_eq!(blocked, "in_use");
    request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "classes.delete",
        json!({ "id": str_field(&empty, "/class/id") }),
    );

    request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "classes.save",
        json!({ "id": class_id, "name": "M.1/1A" }),
    );
    let students = request_ok(&mut stdin, &mut reader, "10", "students.list", json!({}));
    assert_eq!(students["students"][0]["class"], "M.1/1A");
    assert_eq!(students["students"][0]["netScore"], 100);

    let counts = request_ok(&mut stdin, &mut reader, "11", "classes.listWithCounts", json!({}));
    assert_eq!(
        counts["classes"],
        json!([{ "id": class_id, "name": "M.1/1A", "studentCount": 1 }])
    );
}
