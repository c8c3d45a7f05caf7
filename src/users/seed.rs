use tracing::{info, instrument};

use crate::auth::password::PasswordEncoder;
use crate::error::Result;
use crate::users::{repo::UserStore, repo_types::User};

pub const DEMO_USERS: [(&str, &str); 2] = [("one", "secret1"), ("two", "secret2")];

/// Insert the demo accounts that are not already present.
///
/// Returns the rows created by this call; running it again is a no-op.
#[instrument(skip_all)]
pub async fn seed_demo_users(store: &dyn UserStore, encoder: &PasswordEncoder) -> Result<Vec<User>> {
    let mut missing = Vec::new();
    for (username, password) in DEMO_USERS {
        if store.find_by_username(username).await?.is_some() {
            continue;
        }
        missing.push(User::new(username, encoder.hash(password)?));
    }
    if missing.is_empty() {
        info!("demo users already present");
        return Ok(Vec::new());
    }
    let saved = store.save_all(missing).await?;
    info!(count = saved.len(), "demo users seeded");
    Ok(saved)
}
