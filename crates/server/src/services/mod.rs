//! Request-facing services.
//!
//! Services own the business rules; repositories own the SQL. Handlers build
//! a service per request from the shared pool and session store.

pub mod auth;
pub mod listings;
