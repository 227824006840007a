use crate::db;
use crate::reports::ExportSettings;
use crate::store::{SqliteStore, Table, TableStore};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<Box<dyn TableStore>>,
    pub exports: ExportSettings,
}

impl AppState {
    pub fn new(exports: ExportSettings) -> Self {
        Self {
            workspace: None,
            store: None,
            exports,
        }
    }

    /// Open (or create) the workspace database and make it the active store.
    pub fn open_workspace(&mut self, path: &Path) -> anyhow::Result<()> {
        let conn = db::open_db(path)?;
        let store = SqliteStore::new(conn);
        for table in Table::ALL {
            let columns = store.headers(table)?.len();
            let rows = store.rows(table)?.len();
            tracing::debug!(sheet = table.name(), columns, rows, "sheet loaded");
        }
        self.store = Some(Box::new(store));
        self.workspace = Some(path.to_path_buf());
        tracing::info!(workspace = %path.to_string_lossy(), "workspace opened");
        Ok(())
    }
}
