//! Todo store: durable mapping of todo id to todo.

use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;

use super::Todo;
use crate::store::StoreError;
use crate::types::{TodoId, UserId};

/// Persistence contract consumed by the todo service.
pub trait TodoStore: Send + Sync + 'static {
    /// Persist a new todo. Fails with `Duplicate` if the id is taken.
    fn insert(&self, todo: Todo) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn get(&self, id: TodoId) -> impl Future<Output = Result<Option<Todo>, StoreError>> + Send;

    /// All todos owned by `owner`, oldest first.
    fn list_by_owner(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Todo>, StoreError>> + Send;

    /// Replace a stored todo. Fails with `Missing` if the id is gone.
    fn update(&self, todo: Todo) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-process todo store.
#[derive(Debug, Default)]
pub struct InMemoryTodoStore {
    todos: RwLock<HashMap<TodoId, Todo>>,
}

impl InMemoryTodoStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_now(&self, todo: Todo) -> Result<(), StoreError> {
        let mut todos = self.todos.write().map_err(|_| poisoned())?;
        if todos.contains_key(&todo.id) {
            return Err(StoreError::Duplicate);
        }
        todos.insert(todo.id, todo);
        Ok(())
    }

    fn get_now(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let todos = self.todos.read().map_err(|_| poisoned())?;
        Ok(todos.get(&id).cloned())
    }

    fn list_now(&self, owner: UserId) -> Result<Vec<Todo>, StoreError> {
        let todos = self.todos.read().map_err(|_| poisoned())?;
        let mut owned: Vec<Todo> = todos
            .values()
            .filter(|todo| todo.is_owned_by(owner))
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(owned)
    }

    fn update_now(&self, todo: Todo) -> Result<(), StoreError> {
        let mut todos = self.todos.write().map_err(|_| poisoned())?;
        let slot = todos.get_mut(&todo.id).ok_or(StoreError::Missing)?;
        *slot = todo;
        Ok(())
    }
}

impl TodoStore for InMemoryTodoStore {
    fn insert(&self, todo: Todo) -> impl Future<Output = Result<(), StoreError>> + Send {
        std::future::ready(self.insert_now(todo))
    }

    fn get(&self, id: TodoId) -> impl Future<Output = Result<Option<Todo>, StoreError>> + Send {
        std::future::ready(self.get_now(id))
    }

    fn list_by_owner(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Todo>, StoreError>> + Send {
        std::future::ready(self.list_now(owner))
    }

    fn update(&self, todo: Todo) -> impl Future<Output = Result<(), StoreError>> + Send {
        std::future::ready(self.update_now(todo))
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("todo store lock poisoned".to_string())
}
