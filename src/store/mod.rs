//! Table store: the spreadsheet-shaped persistence layer.
//!
//! Every named table is a header row plus data rows, addressed by their
//! 0-based position among the data rows. Column 1 of every row holds the
//! record identifier. Callers always read a whole table, scan it, and
//! write back by position; there is no index and no cache.
//!
//! - [`sqlite::SqliteStore`] persists sheets inside the workspace database.
//! - [`memory::MemoryStore`] keeps them in process, for tests.

#[cfg(test)]
pub mod memory;
pub mod sqlite;

#[cfg(test)]
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// One data row. Cells are stored as text.
pub type Row = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Teachers,
    Behaviors,
    Infractions,
    Students,
    Classes,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Teachers,
        Table::Behaviors,
        Table::Infractions,
        Table::Students,
        Table::Classes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Teachers => "Teachers",
            Table::Behaviors => "Behaviors",
            Table::Infractions => "Infractions",
            Table::Students => "Students",
            Table::Classes => "Classes",
        }
    }

    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Table::Teachers => &["id", "name", "username", "password"],
            Table::Behaviors => &["id", "name", "score", "type"],
            Table::Infractions => &[
                "id",
                "studentUUID",
                "studentName",
                "studentClass",
                "date",
                "behaviorId",
                "comment",
                "timestamp",
            ],
            Table::Students => &[
                "id",
                "studentCode",
                "name",
                "class",
                "initialScore",
                "deductedScore",
                "addedScore",
            ],
            Table::Classes => &["id", "name"],
        }
    }
}

/// Named-table persistence.
///
/// Implementations create a table with its headers the first time it is
/// touched. Row positions are only stable until the next append or delete.
pub trait TableStore {
    /// Header row of the table.
    fn headers(&self, table: Table) -> anyhow::Result<Vec<String>>;

    /// All data rows in insertion order.
    fn rows(&self, table: Table) -> anyhow::Result<Vec<Row>>;

    fn append(&mut self, table: Table, row: Row) -> anyhow::Result<()>;

    /// Append many rows in one write.
    fn append_many(&mut self, table: Table, rows: Vec<Row>) -> anyhow::Result<()>;

    /// Overwrite `cells` starting at column `start_col` of the row at `index`.
    fn update_cells(
        &mut self,
        table: Table,
        index: usize,
        start_col: usize,
        cells: Row,
    ) -> anyhow::Result<()>;

    fn delete_row(&mut self, table: Table, index: usize) -> anyhow::Result<()>;
}

/// Overlay `cells` onto `row` at `start_col`, padding with blanks.
pub(crate) fn overlay(row: &mut Row, start_col: usize, cells: Row) {
    let needed = start_col + cells.len();
    if row.len() < needed {
        row.resize(needed, String::new());
    }
    for (offset, cell) in cells.into_iter().enumerate() {
        row[start_col + offset] = cell;
    }
}
