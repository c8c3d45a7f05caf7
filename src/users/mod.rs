pub mod repo;
pub mod repo_types;
pub mod seed;

pub use repo::{InMemoryUserStore, PgUserStore, UserStore};
pub use repo_types::User;
