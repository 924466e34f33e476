//! PostgreSQL store implementation.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use super::{CredentialStore, DirectoryStore, LockoutUpdate, StoreError};
use crate::models::{Identity, MenuItem, Role};

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)
    }

    async fn apply_lockout_if_unchanged(
        &self,
        identity_id: Uuid,
        expected_attempts: i32,
        update: LockoutUpdate,
    ) -> Result<bool, StoreError> {
        // The WHERE clause on the current counter value makes this a
        // compare-and-set: concurrent failures for the same identity
        // serialize here instead of losing increments.
        let result = sqlx::query(
            r#"
            UPDATE identities
            SET failed_attempts = $1, locked_until = $2
            WHERE identity_id = $3 AND failed_attempts = $4
            "#,
        )
        .bind(update.failed_attempts)
        .bind(update.locked_until)
        .bind(identity_id)
        .bind(expected_attempts)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn reset_lockout(&self, identity_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE identities SET failed_attempts = 0, locked_until = NULL WHERE identity_id = $1",
        )
        .bind(identity_id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for PgStore {
    async fn find_role_by_id(&self, role_id: Uuid) -> Result<Option<Role>, StoreError> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE role_id = $1")
            .bind(role_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)
    }

    async fn list_role_capabilities(&self, role_id: Uuid) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar::<_, String>(
            "SELECT cap_key FROM role_capabilities WHERE role_id = $1 ORDER BY cap_key",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn list_menu_items(&self) -> Result<Vec<MenuItem>, StoreError> {
        sqlx::query_as::<_, MenuItem>("SELECT * FROM menu_items ORDER BY display_order")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from)
    }
}
