use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::Claims;
use crate::error::ApiError;

/// The caller, as rebuilt from a verified token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

/// Request extension set by [`authenticate_jwt`] on every request.
#[derive(Clone, Debug, Default)]
pub struct CurrentUser(pub Option<Principal>);

/// Decode the bearer token, if any, and record the caller.
///
/// Never rejects: a missing or bad token simply leaves the request anonymous,
/// and the route guards decide what anonymous callers may do.
pub async fn authenticate_jwt(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let principal = extract_token(request.headers()).and_then(|token| match state.jwt.verify(token) {
        Ok(claims) => Some(Principal::from(claims)),
        Err(e) => {
            tracing::debug!("Ignoring bad token: {}", e);
            None
        }
    });

    request.extensions_mut().insert(CurrentUser(principal));
    next.run(request).await
}

/// Token from `Authorization: Bearer <token>`; the scheme is case-insensitive.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn unauthorized() -> ApiError {
    ApiError::unauthorized("Unauthorized")
}

pub fn ensure_logged_in(user: &CurrentUser) -> Result<&Principal, ApiError> {
    user.0.as_ref().ok_or_else(unauthorized)
}

pub fn ensure_admin(user: &CurrentUser) -> Result<&Principal, ApiError> {
    ensure_logged_in(user).and_then(|p| if p.is_admin { Ok(p) } else { Err(unauthorized()) })
}

/// Admins may act on anyone; other users only on themselves.
pub fn ensure_self_or_admin<'a>(user: &'a CurrentUser, username: &str) -> Result<&'a Principal, ApiError> {
    ensure_logged_in(user).and_then(|p| {
        if p.is_admin || p.username == username {
            Ok(p)
        } else {
            Err(unauthorized())
        }
    })
}

fn current_user(request: &Request) -> CurrentUser {
    request.extensions().get::<CurrentUser>().cloned().unwrap_or_default()
}

pub async fn require_logged_in(request: Request, next: Next) -> Result<Response, ApiError> {
    ensure_logged_in(&current_user(&request))?;
    Ok(next.run(request).await)
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    ensure_admin(&current_user(&request))?;
    Ok(next.run(request).await)
}

/// Guard for `/users/:username` routes.
pub async fn require_self_or_admin(
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let username = params.get("username").map(String::as_str).unwrap_or_default();
    ensure_self_or_admin(&current_user(&request), username)?;
    Ok(next.run(request).await)
}
