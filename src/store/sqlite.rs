use super::{overlay, Row, Table, TableStore};
use anyhow::{anyhow, Context};
use rusqlite::{Connection, OptionalExtension};

/// Table store backed by the workspace SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wraps a connection whose schema has been initialised by `db::init_schema`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn ensure_sheet(&self, table: Table) -> anyhow::Result<()> {
        let headers = serde_json::to_string(table.headers())?;
        self.conn
            .execute(
                "INSERT OR IGNORE INTO sheets(name, headers) VALUES(?, ?)",
                (table.name(), &headers),
            )
            .with_context(|| format!("failed to create sheet {}", table.name()))?;
        Ok(())
    }

    fn locate(&self, table: Table, index: usize) -> anyhow::Result<(i64, Row)> {
        let found: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT pos, cells FROM sheet_rows WHERE sheet = ? ORDER BY pos LIMIT 1 OFFSET ?",
                (table.name(), index as i64),
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        let (pos, cells) =
            found.ok_or_else(|| anyhow!("{}: no row at index {}", table.name(), index))?;
        Ok((pos, decode_cells(&cells)?))
    }
}

fn decode_cells(raw: &str) -> anyhow::Result<Row> {
    serde_json::from_str(raw).context("corrupt sheet row")
}

impl TableStore for SqliteStore {
    fn headers(&self, table: Table) -> anyhow::Result<Vec<String>> {
        self.ensure_sheet(table)?;
        let raw: String = self.conn.query_row(
            "SELECT headers FROM sheets WHERE name = ?",
            [table.name()],
            |r| r.get(0),
        )?;
        decode_cells(&raw)
    }

    fn rows(&self, table: Table) -> anyhow::Result<Vec<Row>> {
        self.ensure_sheet(table)?;
        let mut stmt = self
            .conn
            .prepare("SELECT cells FROM sheet_rows WHERE sheet = ? ORDER BY pos")?;
        let raw = stmt
            .query_map([table.name()], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        raw.iter().map(|cells| decode_cells(cells)).collect()
    }

    fn append(&mut self, table: Table, row: Row) -> anyhow::Result<()> {
        self.append_many(table, vec![row])
    }

    fn append_many(&mut self, table: Table, rows: Vec<Row>) -> anyhow::Result<()> {
        self.ensure_sheet(table)?;
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO sheet_rows(sheet, cells) VALUES(?, ?)")?;
            for row in &rows {
                stmt.execute((table.name(), serde_json::to_string(row)?))
                    .with_context(|| format!("failed to append to {}", table.name()))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn update_cells(
        &mut self,
        table: Table,
        index: usize,
        start_col: usize,
        cells: Row,
    ) -> anyhow::Result<()> {
        self.ensure_sheet(table)?;
        let (pos, mut row) = self.locate(table, index)?;
        overlay(&mut row, start_col, cells);
        self.conn.execute(
            "UPDATE sheet_rows SET cells = ? WHERE pos = ?",
            (serde_json::to_string(&row)?, pos),
        )?;
        Ok(())
    }

    fn delete_row(&mut self, table: Table, index: usize) -> anyhow::Result<()> {
        self.ensure_sheet(table)?;
        let (pos, _) = self.locate(table, index)?;
        self.conn
            .execute("DELETE FROM sheet_rows WHERE pos = ?", [pos])?;
        Ok(())
    }
}
