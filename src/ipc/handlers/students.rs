use crate::ipc::error::{app_err, ok};
use crate::ipc::helpers::{optional_i64, optional_str, required_str, store_mut, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::model::Student;
use crate::records::infractions;
use crate::records::students::{self, StudentInput};
use serde_json::json;

fn student_json(s: &Student) -> serde_json::Value {
    let mut v = json!(s);
    v["netScore"] = json!(s.net_score());
    v
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match students::list(store) {
        Ok(list) => {
            let rows: Vec<serde_json::Value> = list.iter().map(student_json).collect();
            ok(&req.id, json!({ "students": rows }))
        }
        Err(e) => app_err(req, e),
    }
}

/// Public lookup: the student, their net score and their history.
fn handle_students_get_by_code(state: &mut AppState, req: &Request) -> serde_json::Value {
    let code = match required_str(req, "code") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let student = match students::get_by_code(store, &code) {
        Ok(v) => v,
        Err(e) => return app_err(req, e),
    };
    let history = match infractions::list_by_student(store, &student.id) {
        Ok(v) => v,
        Err(e) => return app_err(req, e),
    };
    ok(
        &req.id,
        json!({
            "student": student,
            "netScore": student.net_score(),
            "infractions": history
        }),
    )
}

fn handle_students_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let initial_score = match optional_i64(req, "initialScore") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let input = StudentInput {
        id: optional_str(req, "id"),
        student_code: optional_str(req, "studentCode").unwrap_or_default(),
        name: optional_str(req, "name").unwrap_or_default(),
        class: optional_str(req, "class").unwrap_or_default(),
        initial_score,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match students::save(store, input) {
        Ok(s) => ok(
            &req.id,
            json!({ "student": student_json(&s), "message": "student saved" }),
        ),
        Err(e) => app_err(req, e),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match students::delete(store, &id) {
        Ok(()) => ok(&req.id, json!({ "message": "student deleted" })),
        Err(e) => app_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.getByCode" => Some(handle_students_get_by_code(state, req)),
        "students.save" => Some(handle_students_save(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        _ => None,
    }
}
