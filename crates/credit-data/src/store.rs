//! SQLite snapshot of the pipeline's tables.

use std::path::{Path, PathBuf};

use credit_core::error::{PipelineError, Result};
use credit_core::sinks::{PersistenceSink, TableSet};
use credit_core::table::{Cell, Table};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction};
use tracing::{debug, info};

/// [`PersistenceSink`] backed by a single SQLite database file.
///
/// Each call to [`persist`](PersistenceSink::persist) runs in one
/// transaction: every named table is dropped, recreated and filled, and any
/// failure rolls all of it back.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Connection::open(&self.path).map_err(|e| {
            PipelineError::Persistence(format!("cannot open {}: {e}", self.path.display()))
        })
    }
}

impl PersistenceSink for SqliteStore {
    fn persist(&self, tables: &TableSet) -> Result<()> {
        let mut conn = self.open()?;
        let tx = conn.transaction().map_err(|e| db_error("begin", e))?;

        for (name, table) in tables {
            replace_table(&tx, name, table)?;
            debug!("Wrote table '{}' ({} rows)", name, table.len());
        }

        tx.commit().map_err(|e| db_error("commit", e))?;
        info!(
            "Persisted {} tables to {}",
            tables.len(),
            self.path.display()
        );
        Ok(())
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn replace_table(tx: &Transaction<'_>, name: &str, table: &Table) -> Result<()> {
    let ident = quote_ident(name);
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.kind.sql_type()))
        .collect();

    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {ident};\nCREATE TABLE {ident} ({});",
        columns.join(", ")
    ))
    .map_err(|e| db_error(name, e))?;

    let placeholders = vec!["?"; table.columns.len()].join(", ");
    let mut stmt = tx
        .prepare(&format!("INSERT INTO {ident} VALUES ({placeholders})"))
        .map_err(|e| db_error(name, e))?;

    for row in &table.rows {
        stmt.execute(params_from_iter(row.iter().map(to_value)))
            .map_err(|e| db_error(name, e))?;
    }
    Ok(())
}

fn to_value(cell: &Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Integer(i) => Value::Integer(*i),
        Cell::Real(f) => Value::Real(*f),
        Cell::Text(s) => Value::Text(s.clone()),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn db_error(context: &str, e: rusqlite::Error) -> PipelineError {
    PipelineError::Persistence(format!("{context}: {e}"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use credit_core::table::Column;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn people(rows: &[(&str, Option<i64>)]) -> Table {
        let mut table = Table::new(vec![Column::text("name"), Column::integer("age")]);
        for (name, age) in rows {
            table.push_row(vec![Cell::from(*name), Cell::from(*age)]);
        }
        table
    }

    fn set(entries: Vec<(&str, Table)>) -> TableSet {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn names_in(path: &Path, table: &str) -> Vec<String> {
        let conn = Connection::open(path).unwrap();
        let mut stmt = conn
            .prepare(&format!("SELECT name FROM {} ORDER BY rowid", quote_ident(table)))
            .unwrap();
        stmt.query_map([], |r| r.get::<_, String>(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    }

    // ── persist ───────────────────────────────────────────────────────────────

    #[test]
    fn test_persist_creates_parent_dir_and_tables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.db");
        let store = SqliteStore::new(&path);

        store
            .persist(&set(vec![("people", people(&[("ana", Some(30)), ("luis", None)]))]))
            .unwrap();

        assert!(path.exists());
        assert_eq!(names_in(&path, "people"), vec!["ana", "luis"]);

        let conn = Connection::open(&path).unwrap();
        let age: Option<i64> = conn
            .query_row("SELECT age FROM people WHERE name = 'luis'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(age, None);
    }

    #[test]
    fn test_persist_replaces_existing_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.db");
        let store = SqliteStore::new(&path);

        store
            .persist(&set(vec![("people", people(&[("old", Some(1))]))]))
            .unwrap();
        store
            .persist(&set(vec![("people", people(&[("new", Some(2))]))]))
            .unwrap();

        assert_eq!(names_in(&path, "people"), vec!["new"]);
    }

    #[test]
    fn test_persist_column_types() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.db");
        let mut table = Table::new(vec![
            Column::text("t"),
            Column::integer("i"),
            Column::real("r"),
        ]);
        table.push_row(vec![Cell::from("x"), Cell::Integer(3), Cell::Real(1.5)]);

        SqliteStore::new(&path)
            .persist(&set(vec![("typed", table)]))
            .unwrap();

        let conn = Connection::open(&path).unwrap();
        let mut stmt = conn.prepare("SELECT type FROM pragma_table_info('typed')").unwrap();
        let types: Vec<String> = stmt
            .query_map([], |r| r.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(types, vec!["TEXT", "INTEGER", "REAL"]);

        let r: f64 = conn.query_row("SELECT r FROM typed", [], |r| r.get(0)).unwrap();
        assert_eq!(r, 1.5);
    }

    #[test]
    fn test_persist_failure_leaves_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.db");
        let store = SqliteStore::new(&path);

        store
            .persist(&set(vec![("a_people", people(&[("kept", Some(1))]))]))
            .unwrap();

        // A table without columns makes CREATE TABLE fail after "a_people"
        // has already been dropped inside the transaction.
        let broken = Table::new(Vec::new());
        let err = store
            .persist(&set(vec![
                ("a_people", people(&[("replaced", Some(2))])),
                ("b_broken", broken),
            ]))
            .unwrap_err();

        assert!(matches!(err, PipelineError::Persistence(_)));
        assert_eq!(names_in(&path, "a_people"), vec!["kept"]);

        let conn = Connection::open(&path).unwrap();
        let exists: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'b_broken'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(exists, 0);
    }

    #[test]
    fn test_persist_quotes_identifiers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.db");
        let mut table = Table::new(vec![Column::text("name"), Column::text("order")]);
        table.push_row(vec![Cell::from("x"), Cell::from("y")]);

        SqliteStore::new(&path)
            .persist(&set(vec![("select", table)]))
            .unwrap();

        assert_eq!(names_in(&path, "select"), vec!["x"]);
    }

    #[test]
    fn test_persist_columns_differing_only_in_case() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.db");
        let mut table = Table::new(vec![
            Column::text("name"),
            Column::integer("year"),
            Column::text("Year"),
            Column::text(""),
        ]);
        table.push_row(vec![
            Cell::from("x"),
            Cell::Integer(2024),
            Cell::from("fy24"),
            Cell::Null,
        ]);

        SqliteStore::new(&path)
            .persist(&set(vec![("sales", table)]))
            .unwrap();

        let conn = Connection::open(&path).unwrap();
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('sales')").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |r| r.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(columns, vec!["name", "year", "Year.1", "Unnamed: 3"]);
        assert_eq!(names_in(&path, "sales"), vec!["x"]);
    }
}
