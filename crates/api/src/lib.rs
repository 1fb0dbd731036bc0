//! Bazaar catalog API library.
//!
//! The HTTP service is built as a library so the router can be exercised in
//! tests and the repositories reused by the `bazaar` CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
