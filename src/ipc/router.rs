use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;
use std::panic::{catch_unwind, AssertUnwindSafe};

type Family = fn(&mut AppState, &Request) -> Option<serde_json::Value>;

const FAMILIES: &[Family] = &[
    handlers::core::try_handle,
    handlers::auth::try_handle,
    handlers::dashboard::try_handle,
    handlers::behaviors::try_handle,
    handlers::classes::try_handle,
    handlers::students::try_handle,
    handlers::infractions::try_handle,
    handlers::reports::try_handle,
    handlers::import::try_handle,
    handlers::backup::try_handle,
];

fn dispatch(state: &mut AppState, req: &Request) -> serde_json::Value {
    for family in FAMILIES {
        if let Some(resp) = family(state, req) {
            return resp;
        }
    }

    tracing::warn!(method = %req.method, "unknown method");
    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}

/// Route one request. A panicking handler becomes an `internal` failure so
/// the loop keeps serving.
pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    tracing::debug!(id = %req.id, method = %req.method, "request");
    match catch_unwind(AssertUnwindSafe(|| dispatch(state, &req))) {
        Ok(resp) => resp,
        Err(_) => {
            tracing::error!(method = %req.method, "handler panicked");
            err(&req.id, "internal", "unexpected internal error", None)
        }
    }
}
