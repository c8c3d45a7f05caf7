use crate::auth::{password::PasswordEncoder, session::SessionStore};
use crate::config::AppConfig;
use crate::users::{InMemoryUserStore, PgUserStore, UserStore};
use crate::web::Views;
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub encoder: PasswordEncoder,
    pub sessions: SessionStore,
    pub views: Views,
}

impl AppState {
    /// Connect the configured user store and run its migrations.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let users = match &config.database_url {
            Some(url) => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;
                let store = PgUserStore::new(db);
                store.migrate().await.context("run migrations")?;
                Arc::new(store) as Arc<dyn UserStore>
            }
            None => {
                tracing::warn!("DATABASE_URL not set; users are kept in memory only");
                Arc::new(InMemoryUserStore::new()) as Arc<dyn UserStore>
            }
        };
        Self::from_parts(Arc::new(config), users)
    }

    pub fn from_parts(config: Arc<AppConfig>, users: Arc<dyn UserStore>) -> anyhow::Result<Self> {
        let encoder = PasswordEncoder::new(&config.hash)?;
        let sessions = SessionStore::new(config.session.clone());
        let views = Views::new()?;
        Ok(Self {
            config,
            users,
            encoder,
            sessions,
            views,
        })
    }
}
