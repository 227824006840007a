use crate::dashboard;
use crate::ipc::error::{app_err, ok};
use crate::ipc::helpers::store_ref;
use crate::ipc::types::{AppState, Request};
use chrono::Local;
use serde_json::json;

fn handle_dashboard_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match dashboard::load_dashboard(store, Local::now().date_naive()) {
        Ok(model) => ok(&req.id, json!(model)),
        Err(e) => app_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.get" => Some(handle_dashboard_get(state, req)),
        _ => None,
    }
}
