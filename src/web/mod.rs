mod dto;
pub mod handlers;
pub mod views;

use crate::state::AppState;
use axum::Router;

pub use views::Views;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::page_routes())
        .merge(handlers::signup_routes())
}
