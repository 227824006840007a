use crate::import;
use crate::ipc::error::{app_err, ok, partial};
use crate::ipc::helpers::{required_str, store_mut};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_students_template(state: &mut AppState, req: &Request) -> serde_json::Value {
    match import::write_template(&state.exports, state.workspace.as_deref()) {
        Ok((content, file)) => ok(
            &req.id,
            json!({
                "fileName": file.file_name,
                "content": content,
                "url": file.url,
                "path": file.path
            }),
        ),
        Err(e) => app_err(req, e),
    }
}

fn handle_students_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let content = match required_str(req, "content") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match import::import_students_csv(store, &content) {
        Ok(summary) if summary.is_clean() => ok(&req.id, json!(summary)),
        Ok(summary) => {
            tracing::warn!(
                imported = summary.imported,
                error_count = summary.error_count,
                "student csv import had errors"
            );
            partial(&req.id, "import_partial", json!(summary))
        }
        Err(e) => app_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "import.studentsTemplate" => Some(handle_students_template(state, req)),
        "import.studentsCsv" => Some(handle_students_csv(state, req)),
        _ => None,
    }
}
