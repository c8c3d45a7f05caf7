use serde::Serialize;
use sqlx::FromRow;

/// User record in the `users` table.
#[derive(Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: Option<i32>,       // assigned by the store on first save
    pub username: String,      // login identity, unique
    #[serde(skip_serializing)]
    pub password: String,      // Argon2 PHC string, never plaintext once stored
}

impl User {
    /// A not-yet-persisted user. `password_hash` must already be hashed.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            password: password_hash.into(),
        }
    }

    /// Blank record for seeding the signup form.
    pub fn empty() -> Self {
        Self::new("", "")
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}
