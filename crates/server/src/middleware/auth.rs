//! Authorization gate and identity extractors.
//!
//! Every request passes through [`session_gate`], which resolves the session
//! cookie against the session store according to a declared route-access
//! policy and attaches the identity for downstream handlers.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, HeaderValue, Method, header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::models::session::{SessionToken, SessionUser};
use crate::sessions::SESSION_COOKIE_NAME;
use crate::state::AppState;

/// How much authentication a route demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// No session handling at all.
    Public,
    /// Identity attached when a valid session cookie is present; anonymous
    /// requests continue.
    Optional,
    /// Requests without a live session are rejected before the handler runs.
    Required,
}

/// Declared access policy, evaluated per `(method, path)` before any handler.
///
/// Everything not explicitly public or optional requires a session.
#[must_use]
pub fn route_access(method: &Method, path: &str) -> RouteAccess {
    if path.starts_with("/public/") {
        return RouteAccess::Public;
    }
    if *method == Method::GET && matches!(path, "/" | "/health" | "/health/ready") {
        return RouteAccess::Public;
    }
    if *method == Method::POST && matches!(path, "/signup" | "/login" | "/logout") {
        return RouteAccess::Public;
    }
    if *method == Method::GET && path == "/items" {
        return RouteAccess::Optional;
    }
    RouteAccess::Required
}

/// Request-level authorization gate.
///
/// An expired session and one that never existed present identically here:
/// expiry is enforced by the sweeper's removal, not by a status flag.
///
/// # Errors
///
/// Returns `AppError::InvalidSession` when a required route is hit without a
/// resolvable session.
pub async fn session_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let access = route_access(request.method(), request.uri().path());
    if access == RouteAccess::Public {
        return Ok(next.run(request).await);
    }

    let resolved = match session_token_from_headers(request.headers()) {
        Some(token) => state.sessions().get(&token).await,
        None => None,
    };

    if access == RouteAccess::Required && resolved.is_none() {
        return Err(AppError::InvalidSession);
    }

    request.extensions_mut().insert(Identity(resolved));
    Ok(next.run(request).await)
}

/// Resolved identity stored in request extensions by the gate.
#[derive(Debug, Clone)]
struct Identity(Option<SessionUser>);

/// Extractor for routes that require a logged-in user.
///
/// The gate has already rejected unauthenticated requests for these routes,
/// so this only unwraps what it attached.
pub struct CurrentUser(pub SessionUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .and_then(|identity| identity.0.clone())
            .map(Self)
            .ok_or(AppError::InvalidSession)
    }
}

/// Extractor for routes where authentication is optional.
pub struct OptionalUser(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<Identity>()
                .and_then(|identity| identity.0.clone()),
        ))
    }
}

// =============================================================================
// Cookie plumbing
// =============================================================================

/// Extract the session token from the request's Cookie header.
#[must_use]
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<SessionToken> {
    parse_cookie(headers, SESSION_COOKIE_NAME).map(SessionToken::from)
}

fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get(header::COOKIE)?;
    let value = cookie.to_str().ok()?;
    for part in value.split(';') {
        if let Some((key, val)) = part.trim().split_once('=')
            && key == name
        {
            return Some(val.to_owned());
        }
    }
    None
}

/// `Set-Cookie` value installing the session token.
///
/// HTTP-only so page scripts can never read the token.
///
/// # Panics
///
/// Never panics: the token is a UUID string and every other byte is a fixed
/// ASCII attribute.
#[must_use]
pub fn session_cookie(token: &SessionToken) -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}={token}; HttpOnly; SameSite=Lax; Path=/"
    ))
    .expect("session cookie is valid ASCII")
}

/// `Set-Cookie` value clearing the session cookie.
///
/// # Panics
///
/// Never panics: the value is fixed ASCII.
#[must_use]
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax; Path=/"
    ))
    .expect("session cookie is valid ASCII")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn policy_declares_public_routes() {
        assert_eq!(route_access(&Method::GET, "/"), RouteAccess::Public);
        assert_eq!(route_access(&Method::GET, "/health"), RouteAccess::Public);
        assert_eq!(route_access(&Method::POST, "/signup"), RouteAccess::Public);
        assert_eq!(route_access(&Method::POST, "/login"), RouteAccess::Public);
        assert_eq!(route_access(&Method::POST, "/logout"), RouteAccess::Public);
        assert_eq!(
            route_access(&Method::GET, "/public/uploads/x.jpg"),
            RouteAccess::Public
        );
    }

    #[test]
    fn listing_reads_are_optional_mutations_required() {
        assert_eq!(route_access(&Method::GET, "/items"), RouteAccess::Optional);
        assert_eq!(route_access(&Method::POST, "/items"), RouteAccess::Required);
        assert_eq!(
            route_access(&Method::DELETE, "/items/3"),
            RouteAccess::Required
        );
    }

    #[test]
    fn unknown_routes_default_to_required() {
        assert_eq!(
            route_access(&Method::GET, "/admin/anything"),
            RouteAccess::Required
        );
        assert_eq!(route_access(&Method::PUT, "/items"), RouteAccess::Required);
    }

    #[test]
    fn parse_cookie_finds_the_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; sessionId=abc-123; other=1"),
        );

        assert_eq!(
            session_token_from_headers(&headers).unwrap().as_str(),
            "abc-123"
        );
    }

    #[test]
    fn parse_cookie_misses_cleanly() {
        let mut headers = HeaderMap::new();
        assert!(session_token_from_headers(&headers).is_none());

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert!(session_token_from_headers(&headers).is_none());
    }

    #[test]
    fn session_cookie_is_http_only() {
        let value = session_cookie(&SessionToken::from("tok"));
        let value = value.to_str().unwrap();
        assert!(value.starts_with("sessionId=tok;"));
        assert!(value.contains("HttpOnly"));
    }
}
