mod sqlite;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::dataset::Table;

pub use sqlite::Sqlite;

/// Opening, writing or committing a relation failed. The relation is left
/// as it was before the write started.
#[derive(Debug, thiserror::Error)]
#[error("failed to write relation `{relation}` to {}", .path.display())]
pub struct StorageWriteFailure {
    pub path: PathBuf,
    pub relation: String,
    #[source]
    pub source: rusqlite::Error,
}

pub trait DBBehavior {
    /// Replace `relation` in the store at `path` with the rows of `table`.
    /// Returns the number of rows written.
    fn persist(path: &Path, relation: &str, table: &Table) -> Result<usize, StorageWriteFailure>;
    fn fetch_table(path: &Path, relation: &str) -> Result<Table>;
}

/// Quote an identifier for use in SQL text.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
