//! The todo resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{TodoId, UserId};

/// A todo owned by exactly one principal.
///
/// # Invariants
/// - `owner` is set from the verified caller at creation and never changes.
/// - `created_at <= updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    #[serde(rename = "user_id")]
    pub owner: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// A new todo for `owner`, created at `now`.
    #[must_use]
    pub fn new(owner: UserId, text: String, now: DateTime<Utc>) -> Self {
        Self {
            id: TodoId::new_random(),
            owner,
            text,
            created_at: now,
            updated_at: now,
        }
    }

    /// True if `caller` owns this todo.
    #[must_use]
    pub fn is_owned_by(&self, caller: UserId) -> bool {
        self.owner == caller
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let owner = UserId::new_random();
        let todo = Todo::new(owner, "buy milk".to_string(), Utc::now());
        let json = serde_json::to_value(&todo).expect("serializable");

        assert_eq!(json["user_id"], serde_json::json!(owner.to_string()));
        assert_eq!(json["id"], serde_json::json!(todo.id.to_string()));
        assert_eq!(json["text"], "buy milk");
        assert!(json.get("owner").is_none());
        assert_eq!(json["created_at"], json["updated_at"]);
    }

    #[test]
    fn test_ownership() {
        let owner = UserId::new_random();
        let todo = Todo::new(owner, "x".to_string(), Utc::now());

        assert!(todo.is_owned_by(owner));
        assert!(!todo.is_owned_by(UserId::new_random()));
    }
}
