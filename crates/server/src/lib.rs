//! Gavel server library.
//!
//! This crate provides the auction backend as a library so the pieces can be
//! tested and reused outside the binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod sessions;
pub mod state;
pub mod uploads;
