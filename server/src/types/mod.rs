pub mod ids;

pub use ids::{InvalidId, TodoId, UserId};
