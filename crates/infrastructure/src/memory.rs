use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use domain::{advance, now, NewTodo, Todo, TodoId};

use crate::{StoreError, TodoStore};

/// Process-local store, mainly for development and tests.
///
/// Ids come from a counter that never goes backwards, so a deleted id is
/// never handed out again.
#[derive(Debug, Default)]
pub struct InMemoryTodoStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    todos: BTreeMap<TodoId, Todo>,
}

impl InMemoryTodoStore {
    fn state(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl TodoStore for InMemoryTodoStore {
    fn insert(&self, new_todo: NewTodo) -> Result<Todo, StoreError> {
        let mut state = self.state()?;
        let id = TodoId::new(state.last_id + 1).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        state.last_id = id.value();

        let todo = new_todo.into_todo(id, now());
        state.todos.insert(id, todo.clone());
        Ok(todo)
    }

    fn get(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(self.state()?.todos.get(&id).cloned())
    }

    fn list_all(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.state()?.todos.values().cloned().collect())
    }

    fn update(&self, todo: &Todo) -> Result<Todo, StoreError> {
        let mut state = self.state()?;
        let stored = state
            .todos
            .get_mut(&todo.id)
            .ok_or(StoreError::NotFound(todo.id))?;

        stored.title = todo.title.clone();
        stored.description = todo.description.clone();
        stored.completed = todo.completed;
        stored.deadline_at = todo.deadline_at;
        stored.updated_at = advance(stored.updated_at);
        Ok(stored.clone())
    }

    fn delete(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(self.state()?.todos.remove(&id))
    }
}
