use crate::ipc::error::{app_err, ok};
use crate::ipc::helpers::{optional_str, required_str, store_mut, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::records::classes::{self, ClassInput};
use serde_json::json;

fn handle_classes_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match classes::list(store) {
        Ok(list) => ok(&req.id, json!({ "classes": list })),
        Err(e) => app_err(req, e),
    }
}

fn handle_classes_list_with_counts(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match classes::list_with_counts(store) {
        Ok(list) => ok(&req.id, json!({ "classes": list })),
        Err(e) => app_err(req, e),
    }
}

fn handle_classes_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let input = ClassInput {
        id: optional_str(req, "id"),
        name: optional_str(req, "name").unwrap_or_default(),
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match classes::save(store, input) {
        Ok(class) => ok(&req.id, json!({ "class": class, "message": "class saved" })),
        Err(e) => app_err(req, e),
    }
}

fn handle_classes_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match classes::delete(store, &id) {
        Ok(()) => ok(&req.id, json!({ "message": "class deleted" })),
        Err(e) => app_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.list" => Some(handle_classes_list(state, req)),
        "classes.listWithCounts" => Some(handle_classes_list_with_counts(state, req)),
        "classes.save" => Some(handle_classes_save(state, req)),
        "classes.delete" => Some(handle_classes_delete(state, req)),
        _ => None,
    }
}
