#![allow(dead_code)]

use std::sync::{Arc, Once};

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use formlogin::{
    app::build_app,
    config::{AppConfig, HashConfig},
    state::AppState,
    users::{seed::seed_demo_users, InMemoryUserStore},
};

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into());
        tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().init();
    });
}

pub fn test_config() -> AppConfig {
    AppConfig {
        hash: HashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        ..AppConfig::default()
    }
}

/// Router over an in-memory store holding the demo accounts.
pub async fn seeded_app() -> (Router, AppState) {
    setup_tracing();
    let state = AppState::from_parts(Arc::new(test_config()), Arc::new(InMemoryUserStore::new()))
        .expect("state builds");
    seed_demo_users(state.users.as_ref(), &state.encoder)
        .await
        .expect("seeding succeeds");
    (build_app(state.clone()), state)
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().method("GET").uri(uri);
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::from(body.to_string())).unwrap()
}

/// `name=value` part of the response's `Set-Cookie`, ready for a `Cookie` header.
pub fn session_cookie(res: &Response<Body>) -> Option<String> {
    res.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.to_string())
}

pub fn location(res: &Response<Body>) -> Option<&str> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub async fn body_string(res: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
