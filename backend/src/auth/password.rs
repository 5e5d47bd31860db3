//! Password hashing and verification
//!
//! New hashes use the configured scheme (bcrypt by default). Verification
//! reads the scheme from the stored hash itself, so bcrypt and argon2
//! records can coexist in one store.
//!
//! # Performance Considerations
//!
//! Both schemes are intentionally CPU-intensive. In async contexts use the
//! `_async` variants, which run on the blocking thread pool.

use crate::config::{PasswordScheme, SecurityConfig};
use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];
const ARGON2_PREFIX: &str = "$argon2";

/// Password hashing service
#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    scheme: PasswordScheme,
    bcrypt_cost: u32,
}

impl PasswordService {
    pub fn new(scheme: PasswordScheme, bcrypt_cost: u32) -> Self {
        Self {
            scheme,
            bcrypt_cost,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(config.password_scheme, config.bcrypt_cost)
    }

    /// Hash a password with the configured scheme (blocking operation)
    pub fn hash(&self, password: &str) -> Result<String> {
        match self.scheme {
            PasswordScheme::Bcrypt => bcrypt::hash(password, self.bcrypt_cost)
                .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e)),
            PasswordScheme::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
                Ok(hash.to_string())
            }
        }
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(&self, password: String) -> Result<String> {
        let service = *self;
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// The comparison is the hashing library's own constant-time check.
    /// Returns an error when the stored hash is in no recognised format.
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        if hash.starts_with(ARGON2_PREFIX) {
            let parsed_hash = PasswordHash::new(hash)
                .map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
            return Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok());
        }

        if BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix)) {
            return bcrypt::verify(password, hash)
                .map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e));
        }

        Err(anyhow::anyhow!("Unrecognised password hash format"))
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}
