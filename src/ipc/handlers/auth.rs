use crate::ipc::error::{app_err, ok};
use crate::ipc::helpers::{required_str, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::records::teachers;
use serde_json::json;

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let username = match required_str(req, "username") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let password = match required_str(req, "password") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match teachers::login(store, &username, &password) {
        Ok(teacher) => {
            tracing::info!(username = %teacher.username, "teacher logged in");
            ok(&req.id, json!({ "teacher": teacher }))
        }
        Err(e) => app_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(handle_login(state, req)),
        _ => None,
    }
}
