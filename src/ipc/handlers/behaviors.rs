use crate::ipc::error::{app_err, err, ok};
use crate::ipc::helpers::{optional_i64, optional_str, required_str, store_mut, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::records::behaviors::{self, BehaviorInput};
use serde_json::json;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match behaviors::list(store) {
        Ok(list) => ok(&req.id, json!({ "behaviors": list })),
        Err(e) => app_err(req, e),
    }
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match behaviors::get(store, &id) {
        Ok(b) => ok(&req.id, json!({ "behavior": b })),
        Err(e) => app_err(req, e),
    }
}

fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let score = match optional_i64(req, "score") {
        Ok(Some(v)) => v,
        Ok(None) => return err(&req.id, "bad_params", "missing score", None),
        Err(e) => return e,
    };
    let input = BehaviorInput {
        id: optional_str(req, "id"),
        name: optional_str(req, "name").unwrap_or_default(),
        score,
        kind: optional_str(req, "type").unwrap_or_default(),
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match behaviors::save(store, input) {
        Ok(b) => ok(
            &req.id,
            json!({ "behavior": b, "message": "behavior saved" }),
        ),
        Err(e) => app_err(req, e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match behaviors::delete(store, &id) {
        Ok(()) => ok(&req.id, json!({ "message": "behavior deleted" })),
        Err(e) => app_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "behaviors.list" => Some(handle_list(state, req)),
        "behaviors.get" => Some(handle_get(state, req)),
        "behaviors.save" => Some(handle_save(state, req)),
        "behaviors.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
