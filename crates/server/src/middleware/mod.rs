//! Request middleware.

pub mod auth;

pub use auth::{CurrentUser, OptionalUser, RouteAccess, route_access, session_gate};
