//! Gavel Core - Shared types library.
//!
//! Common domain types used by the Gavel auction backend. This crate contains
//! only types - no I/O, no database access, no HTTP. The optional `postgres`
//! feature adds sqlx encode/decode support for the ID newtypes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
