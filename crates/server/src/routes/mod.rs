//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /              - Root document
//! GET  /health        - Liveness check
//! GET  /health/ready  - Readiness check (DB ping)
//!
//! # Items
//! GET    /items       - List items (identity optional)
//! POST   /items       - Create item with photos (auth required)
//! DELETE /items/{id}  - Delete an owned item (auth required)
//!
//! # Auth
//! POST /signup        - Create account
//! POST /login         - Log in, sets `sessionId` cookie
//! POST /logout        - Log out, clears cookie
//!
//! # Static
//! GET  /public/*      - Uploaded photos and other public assets
//! ```

pub mod auth;
pub mod items;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the item routes router.
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(items::index).post(items::create))
        .route("/items/{id}", delete(items::destroy))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new().merge(auth_routes()).merge(item_routes())
}
