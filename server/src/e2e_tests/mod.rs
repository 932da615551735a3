//! End-to-end tests at the HTTP level.
//!
//! Each test file covers a specific scenario. Both services run in-process on
//! ephemeral ports and talk to each other over real HTTP, exactly as the
//! deployed binaries do.

#![cfg(test)]

mod helpers;

mod test_auth;
mod test_envelope;
mod test_full_flow;
mod test_invalid_todo_id;
mod test_login;
mod test_missing_auth;
mod test_ownership;
mod test_register;
mod test_register_race;
mod test_update;
