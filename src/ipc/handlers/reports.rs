use crate::ipc::error::{app_err, err, ok};
use crate::ipc::helpers::{optional_str, required_str, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::reports::{self, ExportFormat};
use chrono::Local;
use serde_json::json;

fn handle_reports_data(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match reports::load_report(store) {
        Ok(rows) => ok(&req.id, json!({ "rows": rows })),
        Err(e) => app_err(req, e),
    }
}

fn handle_reports_filter(state: &mut AppState, req: &Request) -> serde_json::Value {
    let search = optional_str(req, "search");
    let class_filter = optional_str(req, "classFilter");
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match reports::load_report(store) {
        Ok(rows) => {
            let rows = reports::filter_rows(rows, search.as_deref(), class_filter.as_deref());
            ok(&req.id, json!({ "rows": rows }))
        }
        Err(e) => app_err(req, e),
    }
}

fn handle_reports_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match required_str(req, "format") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(format) = ExportFormat::parse(&raw) else {
        return err(
            &req.id,
            "bad_params",
            format!("unsupported export format: {raw}"),
            Some(json!({ "supported": ["csv", "pdf"] })),
        );
    };
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match reports::export_report(
        store,
        &state.exports,
        state.workspace.as_deref(),
        format,
        Local::now(),
    ) {
        Ok(file) => {
            tracing::info!(file = %file.file_name, format = %file.format, "report exported");
            let message = file
                .warning
                .clone()
                .unwrap_or_else(|| "report exported".to_string());
            let mut out = json!(file);
            out["message"] = json!(message);
            ok(&req.id, out)
        }
        Err(e) => app_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.data" => Some(handle_reports_data(state, req)),
        "reports.filter" => Some(handle_reports_filter(state, req)),
        "reports.export" => Some(handle_reports_export(state, req)),
        _ => None,
    }
}
