//! In-memory credential store

use super::{CreateCredentialError, CredentialRecord, CredentialStore, NewCredential};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Credential store backed by a `HashMap`, for tests and throwaway instances
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, CredentialRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create(
        &self,
        credential: NewCredential,
    ) -> Result<CredentialRecord, CreateCredentialError> {
        let mut users = self.users.write().await;
        if users.contains_key(&credential.username) {
            return Err(CreateCredentialError::DuplicateUsername(credential.username));
        }

        let record = CredentialRecord {
            user_id: Uuid::new_v4(),
            username: credential.username,
            password_hash: credential.password_hash,
            roles: credential.roles,
        };
        users.insert(record.username.clone(), record.clone());

        Ok(record)
    }

    async fn list(&self) -> Result<Vec<CredentialRecord>> {
        let mut records: Vec<_> = self.users.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(records)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
