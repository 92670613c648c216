use std::sync::Arc;

use domain::{NewTodo, Todo, TodoId};
use shared::StorageBackend;
use thiserror::Error;
use tracing::info;

use crate::{InMemoryTodoStore, SqliteTodoStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Todo not found: {0}")]
    NotFound(TodoId),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Persistence for todos.
///
/// Every call is atomic and durable on return; there is no separate commit
/// step. `list_all` yields todos in ascending id order.
pub trait TodoStore: Send + Sync {
    /// Persists a new todo, assigning `id`, `created_at` and `updated_at`.
    fn insert(&self, new_todo: NewTodo) -> Result<Todo, StoreError>;

    fn get(&self, id: TodoId) -> Result<Option<Todo>, StoreError>;

    fn list_all(&self) -> Result<Vec<Todo>, StoreError>;

    /// Overwrites the mutable fields of an existing todo and refreshes
    /// `updated_at`. `id` and `created_at` are never changed.
    fn update(&self, todo: &Todo) -> Result<Todo, StoreError>;

    /// Removes a todo, returning it as it was before removal.
    fn delete(&self, id: TodoId) -> Result<Option<Todo>, StoreError>;
}

/// Opens the store selected by configuration.
pub fn open_store(backend: &StorageBackend) -> Result<Arc<dyn TodoStore>, StoreError> {
    info!(backend = %backend, "opening todo store");
    let store: Arc<dyn TodoStore> = match backend {
        StorageBackend::Memory => Arc::new(InMemoryTodoStore::default()),
        StorageBackend::SqliteMemory => Arc::new(SqliteTodoStore::open_in_memory()?),
        StorageBackend::SqliteFile(path) => Arc::new(SqliteTodoStore::open(path)?),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_each_backend() {
        let dir = tempfile::tempdir().unwrap();
        let backends = [
            StorageBackend::Memory,
            StorageBackend::SqliteMemory,
            StorageBackend::SqliteFile(dir.path().join("todos.db")),
        ];

        for backend in backends {
            let store = open_store(&backend).unwrap();
            let todo = store.insert(NewTodo::titled("sample")).unwrap();
            assert_eq!(store.get(todo.id).unwrap(), Some(todo), "{backend}");
        }
    }
}
