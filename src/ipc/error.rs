use super::types::Request;
use crate::error::AppError;
use serde_json::{json, Map, Value};

fn envelope(id: &str, success: bool, result: Value) -> Value {
    let mut out = Map::new();
    out.insert("id".into(), json!(id));
    out.insert("success".into(), json!(success));
    match result {
        Value::Object(fields) => out.extend(fields),
        Value::Null => {}
        other => {
            out.insert("data".into(), other);
        }
    }
    Value::Object(out)
}

/// `{ id, success: true, ...result }`
pub fn ok(id: &str, result: Value) -> Value {
    envelope(id, true, result)
}

/// `{ id, success: false, code, ...result }` for mixed outcomes that still
/// carry data, such as a CSV import with rejected rows.
pub fn partial(id: &str, code: &str, result: Value) -> Value {
    let mut out = envelope(id, false, result);
    out["code"] = json!(code);
    out
}

pub fn err(id: &str, code: &str, message: impl Into<String>, details: Option<Value>) -> Value {
    let mut out = json!({
        "id": id,
        "success": false,
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        out["details"] = d;
    }
    out
}

/// Failure response for a domain error, logged with the method name.
pub fn app_err(req: &Request, e: AppError) -> Value {
    if e.is_expected() {
        tracing::warn!(method = %req.method, code = e.code(), "{e}");
    } else {
        tracing::error!(method = %req.method, code = e.code(), error = ?e, "request failed");
    }
    err(&req.id, e.code(), e.to_string(), None)
}
