//! Ownership enforcement for todos.
//!
//! Every operation takes the caller's verified principal id. Single-todo
//! operations run the same pipeline:
//!
//! 1. Resolve the path id (`InvalidResourceId` if it is not a UUID).
//! 2. Load the todo (`NotFound` if absent).
//! 3. Authorize: the todo's owner must equal the caller (`NotOwner`).
//!
//! Listing skips all three and filters by owner at the store.
//!
//! # Pre-conditions
//! - `caller` comes from a verified credential, never from the request body.
//!
//! # Invariants
//! - A caller never reads or mutates a todo it does not own.
//! - The owner of a todo is fixed at creation.
//! - Every store call is bounded by `store_timeout`.

use std::time::Duration;

use chrono::Utc;

use super::{Todo, TodoStore};
use crate::error::ApiError;
use crate::store::{StoreError, bounded};
use crate::types::{InvalidId, TodoId, UserId};

pub const INVALID_TODO_ID: &str = "invalid todo id";
pub const RECORD_NOT_FOUND: &str = "record not found";

/// Error returned by a todo operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    #[error("invalid resource id: {0}")]
    InvalidResourceId(#[from] InvalidId),
    #[error("todo not found")]
    NotFound,
    #[error("caller does not own the todo")]
    NotOwner,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TodoError> for ApiError {
    fn from(error: TodoError) -> Self {
        match error {
            TodoError::InvalidResourceId(_) => Self::Validation(INVALID_TODO_ID.to_string()),
            TodoError::NotFound => Self::NotFound(RECORD_NOT_FOUND.to_string()),
            TodoError::NotOwner => Self::unauthorized(),
            TodoError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

pub struct TodoService<S> {
    store: S,
    store_timeout: Duration,
}

impl<S: TodoStore> TodoService<S> {
    #[must_use]
    pub fn new(store: S, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Create a todo owned by `caller`.
    ///
    /// # Errors
    /// `Store` if the store fails or times out.
    #[tracing::instrument(skip(self, text))]
    pub async fn create(&self, caller: UserId, text: String) -> Result<Todo, TodoError> {
        let todo = Todo::new(caller, text, Utc::now());
        bounded(self.store_timeout, self.store.insert(todo.clone())).await?;
        tracing::debug!(todo_id = %todo.id, "created todo");
        Ok(todo)
    }

    /// All todos owned by `caller`, oldest first.
    ///
    /// # Errors
    /// `Store` if the store fails or times out.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, caller: UserId) -> Result<Vec<Todo>, TodoError> {
        Ok(bounded(self.store_timeout, self.store.list_by_owner(caller)).await?)
    }

    /// The todo at `raw_id`, if `caller` owns it.
    ///
    /// # Errors
    /// `InvalidResourceId`, `NotFound`, `NotOwner` or `Store`.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, caller: UserId, raw_id: &str) -> Result<Todo, TodoError> {
        self.load_owned(caller, raw_id).await
    }

    /// Replace the text of the todo at `raw_id`, if `caller` owns it.
    ///
    /// # Errors
    /// `InvalidResourceId`, `NotFound`, `NotOwner` or `Store`.
    #[tracing::instrument(skip(self, text))]
    pub async fn update(
        &self,
        caller: UserId,
        raw_id: &str,
        text: String,
    ) -> Result<Todo, TodoError> {
        let mut todo = self.load_owned(caller, raw_id).await?;
        todo.text = text;
        todo.updated_at = Utc::now().max(todo.created_at);

        match bounded(self.store_timeout, self.store.update(todo.clone())).await {
            Ok(()) => Ok(todo),
            Err(StoreError::Missing) => Err(TodoError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_owned(&self, caller: UserId, raw_id: &str) -> Result<Todo, TodoError> {
        let id: TodoId = raw_id.parse()?;
        let todo = bounded(self.store_timeout, self.store.get(id))
            .await?
            .ok_or(TodoError::NotFound)?;

        if !todo.is_owned_by(caller) {
            tracing::info!(todo_id = %id, "refused access to a todo owned by another principal");
            return Err(TodoError::NotOwner);
        }
        Ok(todo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todos::InMemoryTodoStore;
    use std::future::Future;

    fn service() -> TodoService<InMemoryTodoStore> {
        TodoService::new(InMemoryTodoStore::new(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_create_stamps_owner_from_caller() {
        let service = service();
        let alice = UserId::new_random();

        let todo = service
            .create(alice, "buy milk".to_string())
            .await
            .expect("created");

        assert_eq!(todo.owner, alice);
        assert_eq!(todo.text, "buy milk");
        assert_eq!(todo.created_at, todo.updated_at);
        assert_eq!(
            service.get(alice, &todo.id.to_string()).await,
            Ok(todo.clone())
        );
    }

    #[tokio::test]
    async fn test_other_caller_is_not_owner() {
        let service = service();
        let alice = UserId::new_random();
        let bob = UserId::new_random();
        let todo = service
            .create(alice, "secret".to_string())
            .await
            .expect("created");
        let id = todo.id.to_string();

        assert_eq!(service.get(bob, &id).await, Err(TodoError::NotOwner));
        assert_eq!(
            service.update(bob, &id, "mine now".to_string()).await,
            Err(TodoError::NotOwner)
        );
        assert_eq!(service.get(alice, &id).await.map(|t| t.text), Ok("secret".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_id_and_absence() {
        let service = service();
        let alice = UserId::new_random();

        assert!(matches!(
            service.get(alice, "abc").await,
            Err(TodoError::InvalidResourceId(_))
        ));
        assert_eq!(
            service.get(alice, &TodoId::new_random().to_string()).await,
            Err(TodoError::NotFound)
        );
        assert_eq!(
            service
                .update(alice, &TodoId::new_random().to_string(), "x".to_string())
                .await,
            Err(TodoError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_list_only_returns_own_todos() {
        let service = service();
        let alice = UserId::new_random();
        let bob = UserId::new_random();
        service.create(alice, "a1".to_string()).await.expect("created");
        service.create(bob, "b1".to_string()).await.expect("created");
        service.create(alice, "a2".to_string()).await.expect("created");

        let texts: Vec<String> = service
            .list(alice)
            .await
            .expect("listed")
            .into_iter()
            .map(|todo| todo.text)
            .collect();
        assert_eq!(texts.len(), 2);
        assert!(texts.contains(&"a1".to_string()));
        assert!(texts.contains(&"a2".to_string()));
        assert!(service.list(UserId::new_random()).await.expect("listed").is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_text_and_keeps_identity() {
        let service = service();
        let alice = UserId::new_random();
        let todo = service.create(alice, "old".to_string()).await.expect("created");

        let updated = service
            .update(alice, &todo.id.to_string(), "new".to_string())
            .await
            .expect("updated");

        assert_eq!(updated.id, todo.id);
        assert_eq!(updated.owner, alice);
        assert_eq!(updated.text, "new");
        assert_eq!(updated.created_at, todo.created_at);
        assert!(updated.updated_at >= todo.updated_at);
        assert_eq!(service.get(alice, &todo.id.to_string()).await, Ok(updated));
    }

    /// A store that never answers.
    struct HangingStore;

    impl TodoStore for HangingStore {
        fn insert(&self, _todo: Todo) -> impl Future<Output = Result<(), StoreError>> + Send {
            std::future::pending()
        }

        fn get(
            &self,
            _id: TodoId,
        ) -> impl Future<Output = Result<Option<Todo>, StoreError>> + Send {
            std::future::pending()
        }

        fn list_by_owner(
            &self,
            _owner: UserId,
        ) -> impl Future<Output = Result<Vec<Todo>, StoreError>> + Send {
            std::future::pending()
        }

        fn update(&self, _todo: Todo) -> impl Future<Output = Result<(), StoreError>> + Send {
            std::future::pending()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_store_times_out() {
        let timeout = Duration::from_secs(5);
        let service = TodoService::new(HangingStore, timeout);
        let alice = UserId::new_random();

        assert_eq!(
            service.list(alice).await,
            Err(TodoError::Store(StoreError::Timeout(timeout)))
        );
        assert_eq!(
            service.create(alice, "x".to_string()).await.map(|t| t.text),
            Err(TodoError::Store(StoreError::Timeout(timeout)))
        );
        assert!(matches!(
            ApiError::from(TodoError::Store(StoreError::Timeout(timeout))),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_api_error_mapping() {
        assert_eq!(
            ApiError::from(TodoError::NotFound),
            ApiError::NotFound("record not found".to_string())
        );
        assert_eq!(ApiError::from(TodoError::NotOwner), ApiError::unauthorized());
        assert_eq!(
            ApiError::from(TodoError::InvalidResourceId(InvalidId("abc".to_string()))),
            ApiError::Validation("invalid todo id".to_string())
        );
    }
}
