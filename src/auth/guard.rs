use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::{auth::session::Principal, state::AppState};

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Permit,
    Authenticated,
}

#[derive(Debug, Clone, Copy)]
pub enum PathPattern {
    Exact(&'static str),
    Any,
}

impl PathPattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => *p == path,
            PathPattern::Any => true,
        }
    }
}

/// Evaluated top to bottom; the first matching pattern decides.
pub const ACCESS_RULES: &[(PathPattern, Access)] = &[
    (PathPattern::Exact("/signup"), Access::Permit),
    (PathPattern::Exact("/register"), Access::Permit),
    (PathPattern::Exact(LOGIN_PATH), Access::Permit),
    (PathPattern::Any, Access::Authenticated),
];

pub fn access_for(path: &str) -> Access {
    ACCESS_RULES
        .iter()
        .find(|(pattern, _)| pattern.matches(path))
        .map(|(_, access)| *access)
        .unwrap_or(Access::Authenticated)
}

/// True for a path on this site: a single leading `/`, never `//` or `/\`.
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

/// Whether a bounced request should be replayed after login.
///
/// Only page loads count: GETs to a local path that are not favicon
/// fetches, JSON requests or XHR calls.
pub fn should_save<B>(req: &axum::http::Request<B>) -> bool {
    if req.method() != Method::GET || !is_local_path(req.uri().path()) {
        return false;
    }
    let favicon = req
        .uri()
        .path()
        .rsplit('/')
        .next()
        .is_some_and(|file| file.starts_with("favicon."));
    let wants_json = req
        .headers()
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("application/json"));
    let xhr = req
        .headers()
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));
    !(favicon || wants_json || xhr)
}

/// Lets requests through when the path is public or the session is
/// authenticated; everything else is sent to the login page.
pub async fn require_authentication(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = state.sessions.from_headers(req.headers());

    if let Some(principal) = session.as_ref().and_then(|s| s.principal.clone()) {
        req.extensions_mut().insert(CurrentUser(principal));
        return next.run(req).await;
    }

    let path = req.uri().path();
    if access_for(path) == Access::Permit {
        return next.run(req).await;
    }

    debug!(%path, "unauthenticated request, redirecting to login");

    if !should_save(&req) {
        return Redirect::to(LOGIN_PATH).into_response();
    }

    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.to_string());

    match session {
        Some(s) => {
            state.sessions.remember_path(s.id, target);
            Redirect::to(LOGIN_PATH).into_response()
        }
        None => {
            let s = state.sessions.start_anonymous(Some(target));
            (
                [(header::SET_COOKIE, state.sessions.cookie(&s))],
                Redirect::to(LOGIN_PATH),
            )
                .into_response()
        }
    }
}

/// Principal of the authenticated session, placed by `require_authentication`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or((StatusCode::UNAUTHORIZED, "Not authenticated".to_string()))
    }
}
