use std::path::Path;

use anyhow::Result;
use rusqlite::{params, Connection as SqliteConn, OpenFlags};

use crate::dataset::{Record, Table};
use crate::db::{quote_ident, DBBehavior, StorageWriteFailure};
use crate::logger::debug;

pub struct Sqlite {}

impl DBBehavior for Sqlite {
    fn persist(path: &Path, relation: &str, table: &Table) -> Result<usize, StorageWriteFailure> {
        write_relation(path, relation, table).map_err(|source| StorageWriteFailure {
            path: path.to_path_buf(),
            relation: relation.to_string(),
            source,
        })
    }

    fn fetch_table(path: &Path, relation: &str) -> Result<Table> {
        let sc = SqliteConn::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let name = quote_ident(relation);

        // columns
        let mut col_stmt = sc.prepare(&format!("PRAGMA table_info({});", name))?;
        let col_iter = col_stmt.query_map([], |row| row.get::<_, String>(1))?; // name is col 1
        let mut columns = Vec::new();
        for c in col_iter { columns.push(c?); }
        if columns.is_empty() {
            anyhow::bail!("no relation `{}` in {}", relation, path.display());
        }
        if columns.len() != Record::COLUMNS.len() {
            anyhow::bail!(
                "relation `{}` has {} columns, expected {}",
                relation,
                columns.len(),
                Record::COLUMNS.len()
            );
        }

        let mut stmt = sc.prepare(&format!("SELECT * FROM {} ORDER BY rowid", name))?;
        let rows = stmt.query_map([], |row| Ok(Record::new(row.get(0)?, row.get(1)?)))?;
        let mut records = Vec::new();
        for r in rows { records.push(r?); }

        Ok(Table { columns, rows: records })
    }
}

/// Drop, recreate and fill `relation` inside a single transaction. The
/// schema comes from `Record::COLUMNS`, matching the bound `x`, `y` order.
/// Dropping the transaction on an early return rolls it back; dropping the
/// connection closes the file.
fn write_relation(path: &Path, relation: &str, table: &Table) -> rusqlite::Result<usize> {
    debug(&format!("sqlite: opening {}", path.display()));
    let mut sc = SqliteConn::open(path)?;
    let tx = sc.transaction()?;

    let name = quote_ident(relation);
    let column_defs = Record::COLUMNS
        .iter()
        .map(|c| format!("{} INTEGER", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    let column_names = Record::COLUMNS
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {name}; CREATE TABLE {name} ({column_defs});"
    ))?;
    debug(&format!("sqlite: recreated {}", name));

    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {name} ({column_names}) VALUES (?1, ?2)"
        ))?;
        for r in &table.rows {
            stmt.execute(params![r.x, r.y])?;
        }
    }

    tx.commit()?;
    debug(&format!("sqlite: committed {} rows", table.len()));
    Ok(table.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{assemble, generate};

    fn sample() -> Table {
        assemble(generate())
    }

    #[test]
    fn writes_twenty_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        let written = Sqlite::persist(&path, "data", &sample()).unwrap();
        assert_eq!(written, 20);

        let read = Sqlite::fetch_table(&path, "data").unwrap();
        assert_eq!(read, sample());
    }

    #[test]
    fn columns_are_exactly_x_and_y() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        Sqlite::persist(&path, "data", &sample()).unwrap();

        let sc = SqliteConn::open(&path).unwrap();
        let mut stmt = sc.prepare("PRAGMA table_info(\"data\")").unwrap();
        let cols: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(
            cols,
            vec![
                ("x".to_string(), "INTEGER".to_string()),
                ("y".to_string(), "INTEGER".to_string()),
            ]
        );
    }

    #[test]
    fn schema_follows_record_shape_not_table_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let mut table = sample();
        table.columns = vec!["label".to_string()];

        Sqlite::persist(&path, "data", &table).unwrap();
        let read = Sqlite::fetch_table(&path, "data").unwrap();
        assert_eq!(read.columns, Record::COLUMNS);
        assert_eq!(read.rows, table.rows);
    }

    #[test]
    fn second_run_replaces_instead_of_appending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        Sqlite::persist(&path, "data", &sample()).unwrap();
        Sqlite::persist(&path, "data", &sample()).unwrap();

        let sc = SqliteConn::open(&path).unwrap();
        let count: i64 = sc
            .query_row("SELECT COUNT(*) FROM data", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 20);
    }

    #[test]
    fn replaces_relation_with_other_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let sc = SqliteConn::open(&path).unwrap();
            sc.execute_batch(
                "CREATE TABLE data (id INTEGER PRIMARY KEY, a TEXT, b REAL);
                 INSERT INTO data (a, b) VALUES ('one', 1.0), ('two', 2.0);",
            )
            .unwrap();
        }

        Sqlite::persist(&path, "data", &sample()).unwrap();
        let read = Sqlite::fetch_table(&path, "data").unwrap();
        assert_eq!(read.columns, vec!["x", "y"]);
        assert_eq!(read.len(), 20);
    }

    #[test]
    fn leaves_other_relations_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let sc = SqliteConn::open(&path).unwrap();
            sc.execute_batch("CREATE TABLE other (v INTEGER); INSERT INTO other VALUES (7);")
                .unwrap();
        }

        Sqlite::persist(&path, "data", &sample()).unwrap();
        let sc = SqliteConn::open(&path).unwrap();
        let v: i64 = sc.query_row("SELECT v FROM other", [], |row| row.get(0)).unwrap();
        assert_eq!(v, 7);
    }

    #[test]
    fn unwritable_path_is_a_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("test.db");

        let err = Sqlite::persist(&path, "data", &sample()).unwrap_err();
        assert_eq!(err.path, path);
        assert_eq!(err.relation, "data");
        assert!(!path.exists());
    }

    #[test]
    fn failed_write_keeps_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        Sqlite::persist(&path, "data", &sample()).unwrap();

        let replacement = assemble(vec![Record::new(9, 9)]);
        let holder = SqliteConn::open(&path).unwrap();
        holder.execute_batch("BEGIN EXCLUSIVE;").unwrap();
        assert!(Sqlite::persist(&path, "data", &replacement).is_err());
        holder.execute_batch("ROLLBACK;").unwrap();

        let read = Sqlite::fetch_table(&path, "data").unwrap();
        assert_eq!(read, sample());
    }

    #[test]
    fn fetching_unknown_relation_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        Sqlite::persist(&path, "data", &sample()).unwrap();

        assert!(Sqlite::fetch_table(&path, "nope").is_err());
    }
}
