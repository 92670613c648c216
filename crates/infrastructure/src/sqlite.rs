//! SQLite-backed todo store.
//!
//! A single connection guarded by a mutex; file databases run in WAL mode.
//! Timestamps are stored as ISO-8601 text through rusqlite's chrono support.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use domain::{advance, now, NewTodo, Todo, TodoId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::{StoreError, TodoStore};

const SELECT_COLUMNS: &str =
    "SELECT id, title, description, completed, deadline_at, created_at, updated_at FROM todos";

#[derive(Debug)]
pub struct SqliteTodoStore {
    conn: Mutex<Connection>,
}

impl SqliteTodoStore {
    /// Opens (creating if needed) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.display(), journal_mode = %mode, "opened sqlite database");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                deadline_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn find(conn: &Connection, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let mut stmt = conn.prepare_cached(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
        let row = stmt
            .query_row(params![id.value()], read_row)
            .optional()?;
        row.map(into_todo).transpose()
    }
}

type RawRow = (
    i64,
    String,
    Option<String>,
    bool,
    Option<domain::Timestamp>,
    domain::Timestamp,
    domain::Timestamp,
);

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn into_todo(raw: RawRow) -> Result<Todo, StoreError> {
    let (id, title, description, completed, deadline_at, created_at, updated_at) = raw;
    Ok(Todo {
        id: TodoId::new(id).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        title,
        description,
        completed,
        deadline_at,
        created_at,
        updated_at,
    })
}

impl TodoStore for SqliteTodoStore {
    fn insert(&self, new_todo: NewTodo) -> Result<Todo, StoreError> {
        let conn = self.conn()?;
        let created_at = now();
        conn.execute(
            "INSERT INTO todos (title, description, completed, deadline_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                new_todo.title,
                new_todo.description,
                new_todo.completed,
                new_todo.deadline_at,
                created_at,
            ],
        )?;
        let id = TodoId::new(conn.last_insert_rowid())
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        debug!(%id, "inserted todo");
        Ok(new_todo.into_todo(id, created_at))
    }

    fn get(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let conn = self.conn()?;
        Self::find(&conn, id)
    }

    fn list_all(&self) -> Result<Vec<Todo>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!("{SELECT_COLUMNS} ORDER BY id"))?;
        let rows = stmt.query_map([], read_row)?;

        let mut todos = Vec::new();
        for row in rows {
            todos.push(into_todo(row?)?);
        }
        Ok(todos)
    }

    fn update(&self, todo: &Todo) -> Result<Todo, StoreError> {
        let conn = self.conn()?;
        let current = Self::find(&conn, todo.id)?.ok_or(StoreError::NotFound(todo.id))?;
        let updated_at = advance(current.updated_at);

        conn.execute(
            "UPDATE todos
             SET title = ?1, description = ?2, completed = ?3, deadline_at = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                todo.title,
                todo.description,
                todo.completed,
                todo.deadline_at,
                updated_at,
                todo.id.value(),
            ],
        )?;

        Ok(Todo {
            title: todo.title.clone(),
            description: todo.description.clone(),
            completed: todo.completed,
            deadline_at: todo.deadline_at,
            updated_at,
            ..current
        })
    }

    fn delete(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let conn = self.conn()?;
        let Some(todo) = Self::find(&conn, id)? else {
            return Ok(None);
        };
        conn.execute("DELETE FROM todos WHERE id = ?1", params![id.value()])?;
        debug!(%id, "deleted todo");
        Ok(Some(todo))
    }
}
