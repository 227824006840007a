use super::error::err;
use super::types::{AppState, Request};
use crate::store::TableStore;
use serde_json::Value;

pub fn required_str(req: &Request, key: &str) -> Result<String, Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {key}"), None))
}

pub fn optional_str(req: &Request, key: &str) -> Option<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
}

/// Integer param given as a JSON number or a numeric string.
pub fn optional_i64(req: &Request, key: &str) -> Result<Option<i64>, Value> {
    let bad = || err(&req.id, "bad_params", format!("{key} must be an integer"), None);
    match req.params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(v) => Ok(Some(v)),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 => Ok(Some(f as i64)),
                _ => Err(bad()),
            },
        },
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| bad()),
        Some(_) => Err(bad()),
    }
}

pub fn store_ref<'a>(state: &'a AppState, req: &Request) -> Result<&'a dyn TableStore, Value> {
    state
        .store
        .as_deref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn store_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut dyn TableStore, Value> {
    match state.store.as_deref_mut() {
        Some(store) => Ok(store),
        None => Err(err(&req.id, "no_workspace", "select a workspace first", None)),
    }
}
