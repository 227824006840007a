use super::{overlay, Row, Table, TableStore};
use anyhow::anyhow;
use std::collections::BTreeMap;

/// In-process table store used by unit tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sheets: BTreeMap<Table, Vec<Row>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sheet_mut(&mut self, table: Table) -> &mut Vec<Row> {
        self.sheets.entry(table).or_default()
    }
}

impl TableStore for MemoryStore {
    fn headers(&self, table: Table) -> anyhow::Result<Vec<String>> {
        Ok(table.headers().iter().map(|h| h.to_string()).collect())
    }

    fn rows(&self, table: Table) -> anyhow::Result<Vec<Row>> {
        Ok(self.sheets.get(&table).cloned().unwrap_or_default())
    }

    fn append(&mut self, table: Table, row: Row) -> anyhow::Result<()> {
        self.sheet_mut(table).push(row);
        Ok(())
    }

    fn append_many(&mut self, table: Table, rows: Vec<Row>) -> anyhow::Result<()> {
        self.sheet_mut(table).extend(rows);
        Ok(())
    }

    fn update_cells(
        &mut self,
        table: Table,
        index: usize,
        start_col: usize,
        cells: Row,
    ) -> anyhow::Result<()> {
        let row = self
            .sheet_mut(table)
            .get_mut(index)
            .ok_or_else(|| anyhow!("{}: no row at index {}", table.name(), index))?;
        overlay(row, start_col, cells);
        Ok(())
    }

    fn delete_row(&mut self, table: Table, index: usize) -> anyhow::Result<()> {
        let sheet = self.sheet_mut(table);
        if index >= sheet.len() {
            return Err(anyhow!("{}: no row at index {}", table.name(), index));
        }
        sheet.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn untouched_table_reads_empty() {
        let store = MemoryStore::new();
        assert!(store.rows(Table::Classes).expect("rows").is_empty());
    }

    #[test]
    fn update_and_delete_by_position() {
        let mut store = MemoryStore::new();
        store
            .append_many(Table::Classes, vec![row(&["c1", "M.1/1"]), row(&["c2", "M.1/2"])])
            .expect("append");
        store
            .update_cells(Table::Classes, 1, 1, row(&["M.2/2"]))
            .expect("update");
        store.delete_row(Table::Classes, 0).expect("delete");
        assert_eq!(
            store.rows(Table::Classes).expect("rows"),
            vec![row(&["c2", "M.2/2"])]
        );
        assert!(store.delete_row(Table::Classes, 5).is_err());
    }
}
