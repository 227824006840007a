use crate::ipc::error::{app_err, ok};
use crate::ipc::helpers::{optional_str, required_str, store_mut, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::records::infractions::{self, InfractionInput};
use chrono::Local;
use serde_json::json;

fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let behavior_id = match required_str(req, "behaviorId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let input = InfractionInput {
        student_id,
        behavior_id,
        date: optional_str(req, "date"),
        comment: optional_str(req, "comment").unwrap_or_default(),
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match infractions::save(store, input, Local::now()) {
        Ok(saved) => match saved.warning {
            None => ok(
                &req.id,
                json!({
                    "infraction": saved.infraction,
                    "scores": saved.scores,
                    "message": "infraction recorded"
                }),
            ),
            Some(warning) => ok(
                &req.id,
                json!({
                    "infraction": saved.infraction,
                    "scores": saved.scores,
                    "warning": warning,
                    "message": "infraction recorded; student scores were not updated"
                }),
            ),
        },
        Err(e) => app_err(req, e),
    }
}

fn handle_list_by_student(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match infractions::list_by_student(store, &student_id) {
        Ok(list) => ok(&req.id, json!({ "infractions": list })),
        Err(e) => app_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "infractions.save" => Some(handle_save(state, req)),
        "infractions.listByStudent" => Some(handle_list_by_student(state, req)),
        _ => None,
    }
}
