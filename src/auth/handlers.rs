use axum::{
    extract::{FromRef, Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use tera::Context;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, LoginPageQuery},
        guard::{is_local_path, LOGIN_PATH},
        provider::{AuthError, AuthenticationProvider},
        session::Principal,
    },
    error::AppError,
    state::AppState,
};

pub fn login_routes() -> Router<AppState> {
    Router::new().route(LOGIN_PATH, get(login_page).post(login))
}

#[instrument(skip(state))]
pub async fn login_page(
    State(state): State<AppState>,
    Query(q): Query<LoginPageQuery>,
) -> Result<Html<String>, AppError> {
    let mut ctx = Context::new();
    ctx.insert("error", &q.error.is_some());
    state.views.render("login.html", &ctx)
}

#[instrument(skip(state, headers, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let provider = AuthenticationProvider::from_ref(&state);
    let user = match provider.authenticate(&form.username, &form.password).await {
        Ok(u) => u,
        Err(e) => {
            match &e {
                AuthError::Store(inner) => warn!(error = %inner, "login failed, store error"),
                other => warn!(reason = %other, "login failed"),
            }
            return Redirect::to("/login?error").into_response();
        }
    };

    let Some(user_id) = user.id else {
        warn!("authenticated user has no id");
        return AppError::Internal.into_response();
    };

    let previous = state.sessions.from_headers(&headers).map(|s| s.id);
    let (session, saved_path) = state.sessions.authenticate(
        previous,
        Principal {
            user_id,
            username: user.username.clone(),
        },
    );
    let target = saved_path
        .filter(|p| is_local_path(p))
        .unwrap_or_else(|| "/".to_string());

    info!(user_id, target = %target, "session established");
    (
        [(header::SET_COOKIE, state.sessions.cookie(&session))],
        Redirect::to(&target),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_form_debug_hides_password() {
        let form = LoginForm {
            username: "one".into(),
            password: "secret1".into(),
        };
        let rendered = format!("{form:?}");
        assert!(rendered.contains("one"));
        assert!(!rendered.contains("secret1"));
    }
}
