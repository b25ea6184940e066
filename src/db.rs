use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};

use crate::models::Todo;

/// Persistence seam for the API handlers.
///
/// Operations addressed by id return `Ok(None)` when no row matches.
pub trait TodoStore: Send + Sync {
    fn insert(&self, title: &str) -> Result<Todo, StoreError>;
    fn list(&self) -> Result<Vec<Todo>, StoreError>;
    fn rename(&self, id: i64, title: &str) -> Result<Option<Todo>, StoreError>;
    fn set_done(&self, id: i64, is_done: bool) -> Result<Option<Todo>, StoreError>;
    fn delete(&self, id: i64) -> Result<Option<Todo>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

const COLUMNS: &str = "id, title, is_done, created_at, updated_at";

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn connect<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("opening database at {}", path.as_ref().display()))?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("opening in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        migrate(&conn).context("migrating todos schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }
}

fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            is_done INTEGER NOT NULL DEFAULT 0 CHECK (is_done IN (0, 1)),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS todos_created_at ON todos (created_at);
        "#,
    )
}

impl TodoStore for Database {
    fn insert(&self, title: &str) -> Result<Todo, StoreError> {
        let now = timestamp_now();
        let conn = self.conn()?;
        let todo = conn.query_row(
            &format!(
                "INSERT INTO todos (title, is_done, created_at, updated_at) \
                 VALUES (?1, 0, ?2, ?2) RETURNING {COLUMNS}"
            ),
            params![title, now],
            todo_from_row,
        )?;
        Ok(todo)
    }

    fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM todos ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], todo_from_row)?;

        let mut todos = Vec::new();
        for todo in rows {
            todos.push(todo?);
        }
        Ok(todos)
    }

    fn rename(&self, id: i64, title: &str) -> Result<Option<Todo>, StoreError> {
        let conn = self.conn()?;
        let todo = conn
            .query_row(
                &format!(
                    "UPDATE todos SET title = ?1, updated_at = ?2 WHERE id = ?3 RETURNING {COLUMNS}"
                ),
                params![title, timestamp_now(), id],
                todo_from_row,
            )
            .optional()?;
        Ok(todo)
    }

    fn set_done(&self, id: i64, is_done: bool) -> Result<Option<Todo>, StoreError> {
        let conn = self.conn()?;
        let todo = conn
            .query_row(
                &format!(
                    "UPDATE todos SET is_done = ?1, updated_at = ?2 WHERE id = ?3 RETURNING {COLUMNS}"
                ),
                params![is_done, timestamp_now(), id],
                todo_from_row,
            )
            .optional()?;
        Ok(todo)
    }

    fn delete(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let conn = self.conn()?;
        let todo = conn
            .query_row(
                &format!("DELETE FROM todos WHERE id = ?1 RETURNING {COLUMNS}"),
                params![id],
                todo_from_row,
            )
            .optional()?;
        Ok(todo)
    }
}

// Fixed-width UTC text, so ORDER BY on the column is chronological.
fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn todo_from_row(row: &Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        is_done: row.get(2)?,
        created_at: parse_datetime(row, 3)?,
        updated_at: parse_datetime(row, 4)?,
    })
}

fn parse_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let value: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}
