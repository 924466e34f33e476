//! Store abstractions for the identity service.
//!
//! The authentication core never touches a database handle directly; it is
//! handed trait objects so the lockout and menu logic stay testable without
//! a live store. `PgStore` is the production implementation, `InMemoryStore`
//! backs the test suites.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Identity, MenuItem, Role};

/// The backing store could not be reached or failed mid-operation.
///
/// Callers map this to a retryable "service unavailable" response; it is
/// never folded into "locked" or "invalid credentials".
#[derive(Debug, Error)]
#[error("store unavailable: {0}")]
pub struct StoreError(#[source] pub anyhow::Error);

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError(anyhow::Error::new(err))
    }
}

/// Fields written by a lockout transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutUpdate {
    pub failed_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
}

/// Durable record of identities and their lockout counters.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Lookup by username (unique, case-sensitive as stored).
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError>;

    /// Conditional lockout write: applied only while the stored counter still
    /// equals `expected_attempts`. Returns false when another writer advanced
    /// the counter first; the caller re-reads and retries.
    async fn apply_lockout_if_unchanged(
        &self,
        identity_id: Uuid,
        expected_attempts: i32,
        update: LockoutUpdate,
    ) -> Result<bool, StoreError>;

    /// Unconditional reset of the lockout fields (successful login or
    /// administrative unlock). Returns false when no such identity exists.
    async fn reset_lockout(&self, identity_id: Uuid) -> Result<bool, StoreError>;

    /// Connectivity probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Read-only access to role and menu definitions.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn find_role_by_id(&self, role_id: Uuid) -> Result<Option<Role>, StoreError>;

    /// Capability keys granted to a role.
    async fn list_role_capabilities(&self, role_id: Uuid) -> Result<Vec<String>, StoreError>;

    /// The full flat menu definition, every role filter is applied in memory.
    async fn list_menu_items(&self) -> Result<Vec<MenuItem>, StoreError>;
}
