use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

use crate::{config::HashConfig, error::AppError};

/// Argon2id hasher for stored credentials.
///
/// New hashes use the configured cost; verification reads the cost back out
/// of the PHC string, so raising the work factor never invalidates old rows.
#[derive(Clone)]
pub struct PasswordEncoder {
    argon2: Argon2<'static>,
    decoy: Arc<str>,
}

impl std::fmt::Debug for PasswordEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordEncoder")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

impl PasswordEncoder {
    pub fn new(cfg: &HashConfig) -> Result<Self, AppError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| AppError::PasswordHash(format!("invalid argon2 params: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy = hash_with(&argon2, "decoy-password-for-unknown-users")?;
        Ok(Self {
            argon2,
            decoy: decoy.into(),
        })
    }

    pub fn hash(&self, plain: &str) -> Result<String, AppError> {
        hash_with(&self.argon2, plain)
    }

    /// Returns `false` for a mismatch and for any hash that does not parse.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burns one verification against a throwaway hash so unknown usernames
    /// cost the same as wrong passwords.
    pub fn verify_decoy(&self, plain: &str) {
        let _ = self.verify(plain, &self.decoy);
    }
}

fn hash_with(argon2: &Argon2<'_>, plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            AppError::PasswordHash(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
pub(crate) fn test_encoder() -> PasswordEncoder {
    PasswordEncoder::new(&HashConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap argon2 params are valid")
}
