//! Todo service.
//!
//! Authenticates every request through a `CredentialVerifier` and enforces
//! that callers only see and change their own todos.

pub mod caller;
pub mod routes;
pub mod service;
pub mod store;
pub mod todo;

pub use caller::{Caller, TodoState};
pub use routes::routes;
pub use service::{TodoError, TodoService};
pub use store::{InMemoryTodoStore, TodoStore};
pub use todo::Todo;
