//! Bazaar Core - Shared domain types.
//!
//! This crate provides the validated domain types used across all Bazaar
//! components:
//! - `api` - The HTTP catalog service
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Database encode/decode impls are behind the `postgres`
//! feature so the types stay usable anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, usernames, prices, stock,
//!   pagination and image MIME types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
