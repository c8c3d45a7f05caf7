use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_minutes: i64,
    pub secure_cookie: bool,
}

/// Argon2 work factor used for new hashes.
#[derive(Debug, Clone, Deserialize)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Postgres URL; the in-memory user store is used when absent.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
    pub hash: HashConfig,
    pub seed_demo_users: bool,
}

/// Ten years; keeps `now + ttl` well inside the representable date range.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

impl SessionConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&self.ttl_minutes) {
            anyhow::bail!(
                "SESSION_TTL_MINUTES must be between 1 and {MAX_SESSION_TTL_MINUTES}, got {}",
                self.ttl_minutes
            );
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "SESSION".into(),
            ttl_minutes: 30,
            secure_cookie: false,
        }
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: "0.0.0.0".into(),
            port: 8080,
            session: SessionConfig::default(),
            hash: HashConfig::default(),
            seed_demo_users: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or(defaults.session.cookie_name),
            ttl_minutes: parsed("SESSION_TTL_MINUTES")?.unwrap_or(defaults.session.ttl_minutes),
            secure_cookie: parsed("SESSION_COOKIE_SECURE")?
                .unwrap_or(defaults.session.secure_cookie),
        };
        let hash = HashConfig {
            memory_kib: parsed("ARGON2_MEMORY_KIB")?.unwrap_or(defaults.hash.memory_kib),
            iterations: parsed("ARGON2_ITERATIONS")?.unwrap_or(defaults.hash.iterations),
            parallelism: parsed("ARGON2_PARALLELISM")?.unwrap_or(defaults.hash.parallelism),
        };
        session.validate()?;
        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or(defaults.host),
            port: parsed("APP_PORT")?.unwrap_or(defaults.port),
            session,
            hash,
            seed_demo_users: parsed("SEED_DEMO_USERS")?.unwrap_or(defaults.seed_demo_users),
        })
    }
}

fn parsed<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw:?}: {e}")),
        Err(_) => Ok(None),
    }
}
