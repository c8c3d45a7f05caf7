use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::users::repo_types::User;

/// Persistence for user credentials.
///
/// Stores never hash: callers hand in a `User` whose `password` is already
/// the encoded hash.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Insert a new user and return it with its assigned id.
    async fn save(&self, user: User) -> Result<User>;

    /// Insert all users or none of them.
    async fn save_all(&self, users: Vec<User>) -> Result<Vec<User>>;
}

fn ensure_unsaved(user: &User) -> Result<()> {
    match user.id {
        Some(id) => Err(AppError::Conflict(format!("user {id} is already persisted"))),
        None => Ok(()),
    }
}

fn duplicate(username: &str) -> AppError {
    AppError::Conflict(format!("username '{username}' is already taken"))
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn map_insert_error(e: sqlx::Error, username: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return duplicate(username);
        }
    }
    AppError::Database(e)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn save(&self, user: User) -> Result<User> {
        ensure_unsaved(&user)?;
        let saved = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING id, username, password
            "#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &user.username))?;
        debug!(user_id = ?saved.id, username = %saved.username, "user inserted");
        Ok(saved)
    }

    async fn save_all(&self, users: Vec<User>) -> Result<Vec<User>> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(users.len());
        for user in users {
            ensure_unsaved(&user)?;
            let row = sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (username, password)
                VALUES ($1, $2)
                RETURNING id, username, password
                "#,
            )
            .bind(&user.username)
            .bind(&user.password)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_insert_error(e, &user.username))?;
            saved.push(row);
        }
        tx.commit().await?;
        debug!(count = saved.len(), "users inserted");
        Ok(saved)
    }
}

/// Process-local store, used when no database is configured and in tests.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    inner: Arc<RwLock<Rows>>,
}

#[derive(Default)]
struct Rows {
    users: Vec<User>,
    last_id: i32,
}

impl Rows {
    fn insert(&mut self, mut user: User) -> User {
        self.last_id += 1;
        user.id = Some(self.last_id);
        self.users.push(user.clone());
        user
    }

    fn contains(&self, username: &str) -> bool {
        self.users.iter().any(|u| u.username == username)
    }
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let rows = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(rows.users.iter().find(|u| u.username == username).cloned())
    }

    async fn save(&self, user: User) -> Result<User> {
        ensure_unsaved(&user)?;
        let mut rows = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if rows.contains(&user.username) {
            return Err(duplicate(&user.username));
        }
        Ok(rows.insert(user))
    }

    async fn save_all(&self, users: Vec<User>) -> Result<Vec<User>> {
        let mut rows = self.inner.write().unwrap_or_else(|e| e.into_inner());
        for (i, user) in users.iter().enumerate() {
            ensure_unsaved(user)?;
            let repeated = users[..i].iter().any(|u| u.username == user.username);
            if repeated || rows.contains(&user.username) {
                return Err(duplicate(&user.username));
            }
        }
        Ok(users.into_iter().map(|u| rows.insert(u)).collect())
    }
}
