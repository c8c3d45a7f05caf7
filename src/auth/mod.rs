use crate::state::AppState;
use axum::Router;

pub(crate) mod dto;
pub mod guard;
pub mod handlers;
pub mod password;
pub mod provider;
pub mod session;

pub fn router() -> Router<AppState> {
    handlers::login_routes()
}
