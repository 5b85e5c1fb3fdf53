//! Authentication route handlers.

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;
use crate::middleware::auth::{clear_session_cookie, session_cookie, session_token_from_headers};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    /// Base64-encoded raw password. Transport encoding, not protection.
    pub password: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    /// Base64-encoded raw password.
    pub password: String,
}

/// Handle signup form submission.
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<impl IntoResponse> {
    let service = AuthService::new(state.pool(), state.sessions());
    let user_id = service
        .signup(&form.username, &form.email, &form.password)
        .await?;

    tracing::info!(%user_id, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "userId": user_id })),
    ))
}

/// Handle login form submission.
///
/// On success the session token travels back as an HTTP-only cookie; a repeat
/// login while a session is live re-sets the same token.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse> {
    let service = AuthService::new(state.pool(), state.sessions());
    let token = service.login(&form.username, &form.password).await?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, session_cookie(&token));

    Ok((headers, Json(json!({ "message": "Login successful" }))))
}

/// Handle logout.
///
/// Always succeeds: removing an absent session is a no-op, and the cookie is
/// cleared either way.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session_token_from_headers(&headers) {
        AuthService::new(state.pool(), state.sessions())
            .logout(&token)
            .await;
    }

    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, clear_session_cookie());

    (
        response_headers,
        Json(json!({ "message": "Logged out successfully" })),
    )
}
