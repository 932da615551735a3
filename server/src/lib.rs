// Life of a request:
// 1. Identity service
//     - Register: validate body, hash password, insert-if-absent
//     - Login: look up by email, check hash, issue token
//     - Auth: parse bearer header, verify token, return subject
// 2. Todo service
//     - Authenticate: forward the bearer header to the identity service
//     - Resolve the todo id, load it, check the owner
//     - Read or mutate the store
//
// System components:
//  - Token codec and password hashing (auth)
//  - Credential store and todo store
//  - Remote verification adapter

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod server;
pub mod store;
pub mod todos;
pub mod types;
pub mod verification;

mod e2e_tests;
