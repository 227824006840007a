//! Per-entity accessors over the table store.
//!
//! Every call loads the whole table, filters in memory and writes back a
//! single row range or an appended row.

pub mod behaviors;
pub mod classes;
pub mod infractions;
pub mod students;
pub mod teachers;

use crate::store::{Row, Table, TableStore};
use uuid::Uuid;

/// Linear scan for the row whose identifier column equals `id`.
pub fn find_row(
    store: &dyn TableStore,
    table: Table,
    id: &str,
) -> anyhow::Result<Option<(usize, Row)>> {
    let id = id.trim();
    if id.is_empty() {
        return Ok(None);
    }
    Ok(store
        .rows(table)?
        .into_iter()
        .enumerate()
        .find(|(_, row)| row.first().map(|c| c.trim()) == Some(id)))
}

/// Case-insensitive comparison used for names, codes and class references.
pub fn same_key(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Trimmed value, `None` when blank.
pub fn non_empty(v: Option<&str>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
