use axum::http::StatusCode;
use tower::ServiceExt;

mod common;
use common::{body_string, get, location, post_form, seeded_app, session_cookie};

#[tokio::test]
async fn test_seeded_users_can_log_in() {
    let (app, _) = seeded_app().await;
    for (user, pass) in [("one", "secret1"), ("two", "secret2")] {
        let res = app
            .clone()
            .oneshot(post_form("/login", &format!("username={user}&password={pass}"), None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{user}");
        assert_eq!(location(&res), Some("/"), "{user}");
        let cookie = session_cookie(&res).expect("session cookie");

        let res = app.clone().oneshot(get("/hello", Some(&cookie))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_string(res).await;
        assert!(body.contains(&format!("Hello {user}!")));
    }
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_fail_alike() {
    let (app, state) = seeded_app().await;
    for body in ["username=one&password=secret2", "username=nobody&password=secret1"] {
        let res = app.clone().oneshot(post_form("/login", body, None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), Some("/login?error"));
        assert!(session_cookie(&res).is_none());
    }
    assert!(state.sessions.is_empty());

    let res = app.oneshot(get("/login?error", None)).await.unwrap();
    let body = body_string(res).await;
    assert!(body.contains("Invalid username and password."));
}

#[tokio::test]
async fn test_login_returns_to_saved_request() {
    let (app, _) = seeded_app().await;

    let res = app
        .clone()
        .oneshot(get("/greeting?name=Bob", None))
        .await
        .unwrap();
    assert_eq!(location(&res), Some("/login"));
    let anonymous = session_cookie(&res).expect("anonymous session cookie");

    let res = app
        .clone()
        .oneshot(post_form(
            "/login",
            "username=one&password=secret1",
            Some(&anonymous),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/greeting?name=Bob"));
    let authenticated = session_cookie(&res).expect("new session cookie");
    assert_ne!(authenticated, anonymous);

    // the pre-login session does not survive the login
    let res = app.clone().oneshot(get("/", Some(&anonymous))).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let res = app
        .oneshot(get("/greeting?name=Bob", Some(&authenticated)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res).await.contains("Hello, Bob!"));
}

#[tokio::test]
async fn test_authenticated_pages_render() {
    let (app, _) = seeded_app().await;
    let res = app
        .clone()
        .oneshot(post_form("/login", "username=two&password=secret2", None))
        .await
        .unwrap();
    let cookie = session_cookie(&res).unwrap();

    let res = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res).await.contains("Welcome!"));

    let res = app.oneshot(get("/greeting", Some(&cookie))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res).await.contains("Hello, World!"));
}

#[tokio::test]
async fn test_off_site_target_is_never_followed() {
    let (app, state) = seeded_app().await;

    let res = app
        .clone()
        .oneshot(get("//evil.example/phish", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/login"));
    assert!(session_cookie(&res).is_none());
    assert!(state.sessions.is_empty());

    // an existing session keeps its earlier target
    let res = app.clone().oneshot(get("/hello", None)).await.unwrap();
    let anonymous = session_cookie(&res).expect("anonymous session cookie");
    app.clone()
        .oneshot(get("//evil.example/phish", Some(&anonymous)))
        .await
        .unwrap();

    let res = app
        .oneshot(post_form(
            "/login",
            "username=one&password=secret1",
            Some(&anonymous),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/hello"));
}

#[tokio::test]
async fn test_favicon_fetch_keeps_saved_request() {
    let (app, _) = seeded_app().await;

    let res = app.clone().oneshot(get("/hello", None)).await.unwrap();
    let anonymous = session_cookie(&res).expect("anonymous session cookie");

    let res = app
        .clone()
        .oneshot(get("/favicon.ico", Some(&anonymous)))
        .await
        .unwrap();
    assert_eq!(location(&res), Some("/login"));

    let res = app
        .clone()
        .oneshot(post_form(
            "/login",
            "username=one&password=secret1",
            Some(&anonymous),
        ))
        .await
        .unwrap();
    assert_eq!(location(&res), Some("/hello"));
    let cookie = session_cookie(&res).unwrap();

    let res = app.oneshot(get("/hello", Some(&cookie))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_login_field_is_a_failed_login() {
    let (app, _) = seeded_app().await;
    for body in ["username=one", "password=secret1", ""] {
        let res = app.clone().oneshot(post_form("/login", body, None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{body:?}");
        assert_eq!(location(&res), Some("/login?error"), "{body:?}");
    }
}
