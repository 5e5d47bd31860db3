//! Credential storage
//!
//! The login flow only reads from the store; registration and the startup
//! admin bootstrap are the only writers.

mod memory;
mod postgres;

pub use memory::InMemoryCredentialStore;
pub use postgres::PgCredentialStore;

use anyhow::Result;
use async_trait::async_trait;
use sys_touch_shared::{Role, UserSummary};
use thiserror::Error;
use uuid::Uuid;

/// Stored username / password hash / roles tuple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub user_id: Uuid,
    pub username: String,
    pub password_hash: String,
    /// In the store's iteration order
    pub roles: Vec<Role>,
}

impl From<CredentialRecord> for UserSummary {
    fn from(record: CredentialRecord) -> Self {
        UserSummary {
            user_id: record.user_id.to_string(),
            username: record.username,
            roles: record.roles,
        }
    }
}

/// Input for creating a credential record
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

/// Failure to create a credential record
#[derive(Error, Debug)]
pub enum CreateCredentialError {
    /// Another record already holds this username
    #[error("username '{0}' already exists")]
    DuplicateUsername(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Credential store, safe for concurrent reads
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Case-sensitive exact match on username
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>>;

    /// Fails with `DuplicateUsername` when the username is taken, even if a
    /// prior lookup saw it free
    async fn create(
        &self,
        credential: NewCredential,
    ) -> Result<CredentialRecord, CreateCredentialError>;

    /// All records, ordered by username
    async fn list(&self) -> Result<Vec<CredentialRecord>>;

    async fn health_check(&self) -> Result<()>;
}
