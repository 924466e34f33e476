//! In-memory store used by the test suites.
//!
//! Mirrors the PostgreSQL compare-and-set semantics for lockout updates so
//! the concurrency properties of the authenticator can be exercised without
//! a live database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::{CredentialStore, DirectoryStore, LockoutUpdate, StoreError};
use crate::models::{Identity, MenuItem, Role};

#[derive(Default)]
pub struct InMemoryStore {
    identities: Mutex<HashMap<Uuid, Identity>>,
    roles: Mutex<HashMap<Uuid, Role>>,
    capabilities: Mutex<HashMap<Uuid, Vec<String>>>,
    menu_items: Mutex<Vec<MenuItem>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_identity(&self, identity: Identity) {
        self.identities
            .lock()
            .expect("identities lock")
            .insert(identity.identity_id, identity);
    }

    pub fn insert_role(&self, role: Role, capabilities: Vec<String>) {
        self.capabilities
            .lock()
            .expect("capabilities lock")
            .insert(role.role_id, capabilities);
        self.roles
            .lock()
            .expect("roles lock")
            .insert(role.role_id, role);
    }

    pub fn insert_menu_item(&self, item: MenuItem) {
        self.menu_items.lock().expect("menu lock").push(item);
    }

    /// Snapshot an identity for test assertions.
    pub fn get_identity(&self, identity_id: Uuid) -> Option<Identity> {
        self.identities
            .lock()
            .expect("identities lock")
            .get(&identity_id)
            .cloned()
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        let identities = self.identities.lock().expect("identities lock");
        Ok(identities.values().find(|i| i.username == username).cloned())
    }

    async fn apply_lockout_if_unchanged(
        &self,
        identity_id: Uuid,
        expected_attempts: i32,
        update: LockoutUpdate,
    ) -> Result<bool, StoreError> {
        let mut identities = self.identities.lock().expect("identities lock");
        match identities.get_mut(&identity_id) {
            Some(identity) if identity.failed_attempts == expected_attempts => {
                identity.failed_attempts = update.failed_attempts;
                identity.locked_until = update.locked_until;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reset_lockout(&self, identity_id: Uuid) -> Result<bool, StoreError> {
        let mut identities = self.identities.lock().expect("identities lock");
        match identities.get_mut(&identity_id) {
            Some(identity) => {
                identity.failed_attempts = 0;
                identity.locked_until = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for InMemoryStore {
    async fn find_role_by_id(&self, role_id: Uuid) -> Result<Option<Role>, StoreError> {
        Ok(self
            .roles
            .lock()
            .expect("roles lock")
            .get(&role_id)
            .cloned())
    }

    async fn list_role_capabilities(&self, role_id: Uuid) -> Result<Vec<String>, StoreError> {
        Ok(self
            .capabilities
            .lock()
            .expect("capabilities lock")
            .get(&role_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_menu_items(&self) -> Result<Vec<MenuItem>, StoreError> {
        Ok(self.menu_items.lock().expect("menu lock").clone())
    }
}
