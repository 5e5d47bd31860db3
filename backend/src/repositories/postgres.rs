//! PostgreSQL credential store

use super::{CreateCredentialError, CredentialRecord, CredentialStore, NewCredential};
use crate::db;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use sys_touch_shared::Role;
use uuid::Uuid;

/// User row joined with its role names
#[derive(Debug, Clone, sqlx::FromRow)]
struct CredentialRow {
    user_id: Uuid,
    username: String,
    password_hash: String,
    roles: Vec<String>,
}

impl From<CredentialRow> for CredentialRecord {
    fn from(row: CredentialRow) -> Self {
        CredentialRecord {
            user_id: row.user_id,
            username: row.username,
            password_hash: row.password_hash,
            roles: row.roles.into_iter().map(Role::new).collect(),
        }
    }
}

// Roles aggregate in role_id order, which fixes the scope claim order.
const SELECT_CREDENTIALS: &str = r#"
    SELECT u.user_id, u.username, u.password_hash,
           COALESCE(
               array_agg(r.name ORDER BY r.role_id) FILTER (WHERE r.name IS NOT NULL),
               '{}'
           ) AS roles
    FROM tb_users u
    LEFT JOIN tb_users_roles ur ON ur.user_id = u.user_id
    LEFT JOIN tb_roles r ON r.role_id = ur.role_id
"#;

/// Credential store backed by PostgreSQL
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>> {
        let query = format!(
            "{} WHERE u.username = $1 GROUP BY u.user_id, u.username, u.password_hash",
            SELECT_CREDENTIALS
        );

        let row = sqlx::query_as::<_, CredentialRow>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn create(
        &self,
        credential: NewCredential,
    ) -> Result<CredentialRecord, CreateCredentialError> {
        let mut tx = self.pool.begin().await.map_err(anyhow::Error::from)?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO tb_users (user_id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING user_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&credential.username)
        .bind(&credential.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                CreateCredentialError::DuplicateUsername(credential.username.clone())
            }
            other => CreateCredentialError::Store(other.into()),
        })?;

        for role in &credential.roles {
            let inserted = sqlx::query(
                r#"
                INSERT INTO tb_users_roles (user_id, role_id)
                SELECT $1, role_id FROM tb_roles WHERE name = $2
                "#,
            )
            .bind(user_id)
            .bind(role.name())
            .execute(&mut *tx)
            .await
            .map_err(anyhow::Error::from)?;

            if inserted.rows_affected() == 0 {
                return Err(anyhow::anyhow!("unknown role '{}'", role).into());
            }
        }

        tx.commit().await.map_err(anyhow::Error::from)?;

        let mut roles = credential.roles;
        roles.sort_by_key(|role| role_rank(role.name()));

        Ok(CredentialRecord {
            user_id,
            username: credential.username,
            password_hash: credential.password_hash,
            roles,
        })
    }

    async fn list(&self) -> Result<Vec<CredentialRecord>> {
        let query = format!(
            "{} GROUP BY u.user_id, u.username, u.password_hash ORDER BY u.username",
            SELECT_CREDENTIALS
        );

        let rows = sqlx::query_as::<_, CredentialRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn health_check(&self) -> Result<()> {
        db::health_check(&self.pool).await
    }
}

/// Seeded role ids, mirroring the migration
fn role_rank(name: &str) -> i64 {
    match name {
        Role::ADMIN => 1,
        Role::BASIC => 2,
        _ => i64::MAX,
    }
}
