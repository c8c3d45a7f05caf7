use axum::{
    extract::{Query, State},
    response::Html,
    routing::{get, post},
    Form, Router,
};
use tera::Context;
use tracing::{error, info, instrument};

use crate::{
    auth::guard::CurrentUser,
    error::AppError,
    state::AppState,
    users::User,
    web::dto::{GreetingQuery, SignupForm},
};

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/hello", get(hello))
        .route("/greeting", get(greeting))
}

pub fn signup_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", get(signup_form))
        .route("/register", post(register))
}

pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.views.render("home.html", &Context::new())
}

#[instrument(skip(state))]
pub async fn hello(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Html<String>, AppError> {
    let mut ctx = Context::new();
    ctx.insert("username", &principal.username);
    state.views.render("hello.html", &ctx)
}

#[instrument(skip(state))]
pub async fn greeting(
    State(state): State<AppState>,
    Query(q): Query<GreetingQuery>,
) -> Result<Html<String>, AppError> {
    let mut ctx = Context::new();
    ctx.insert("name", q.name());
    state.views.render("greeting.html", &ctx)
}

pub async fn signup_form(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let mut ctx = Context::new();
    ctx.insert("user", &User::empty());
    state.views.render("signup.html", &ctx)
}

/// Hash the submitted password and store the new account.
///
/// Failures are shown on the error page rather than as an error status.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Html<String>, AppError> {
    info!("signup submitted");
    match create_account(&state, form).await {
        Ok(user) => {
            info!(user_id = ?user.id, username = %user.username, "user registered");
            let mut ctx = Context::new();
            ctx.insert("user", &user);
            state.views.render("signup-result.html", &ctx)
        }
        Err(e) => {
            error!(error = %e, "registration failed");
            let mut ctx = Context::new();
            ctx.insert("error_message", &e.to_string());
            state.views.render("signup-error.html", &ctx)
        }
    }
}

async fn create_account(state: &AppState, form: SignupForm) -> Result<User, AppError> {
    if form.username.trim().is_empty() {
        return Err(AppError::BadRequest("username must not be blank".into()));
    }
    if form.password.is_empty() {
        return Err(AppError::BadRequest("password must not be blank".into()));
    }
    let hash = state.encoder.hash(&form.password)?;
    state.users.save(User::new(form.username, hash)).await
}
