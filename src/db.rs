use anyhow::Context;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub const DB_FILE: &str = "conduct.sqlite3";

pub fn db_path(workspace: &Path) -> PathBuf {
    workspace.join(DB_FILE)
}

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace).with_context(|| {
        format!(
            "failed to create workspace {}",
            workspace.to_string_lossy()
        )
    })?;
    let conn = Connection::open(db_path(workspace))?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Sheet storage: one header row per named table, data rows kept in
/// insertion order by `pos`.
pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sheets(
            name TEXT PRIMARY KEY,
            headers TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS sheet_rows(
            pos INTEGER PRIMARY KEY AUTOINCREMENT,
            sheet TEXT NOT NULL,
            cells TEXT NOT NULL,
            FOREIGN KEY(sheet) REFERENCES sheets(name)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sheet_rows_sheet ON sheet_rows(sheet, pos)",
        [],
    )?;

    Ok(())
}
