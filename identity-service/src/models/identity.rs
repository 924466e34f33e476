//! Identity model - user accounts capable of authenticating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Account status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
        }
    }

    /// Resolve a stored status code. The match is strict and case-sensitive:
    /// only the exact code `"active"` grants Active, every other value
    /// (including legacy codes the HR suite may have written) is Inactive.
    pub fn from_code(code: &str) -> AccountStatus {
        match code {
            "active" => AccountStatus::Active,
            _ => AccountStatus::Inactive,
        }
    }
}

/// Identity row from the `identities` table.
///
/// Carries the password hash -- never serialize this to API responses.
/// Use [`IdentitySummary`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Identity {
    pub identity_id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role_id: Uuid,
    pub status_code: String,
    pub failed_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_utc: DateTime<Utc>,
}

impl Identity {
    /// Create a new identity (provisioning happens outside this service;
    /// this constructor exists for seeding and tests).
    pub fn new(username: String, password_hash: String, role_id: Uuid) -> Self {
        Self {
            identity_id: Uuid::new_v4(),
            username,
            password_hash,
            role_id,
            status_code: AccountStatus::Active.as_str().to_string(),
            failed_attempts: 0,
            locked_until: None,
            created_utc: Utc::now(),
        }
    }

    pub fn status(&self) -> AccountStatus {
        AccountStatus::from_code(&self.status_code)
    }

    pub fn is_active(&self) -> bool {
        self.status() == AccountStatus::Active
    }

    /// Convert to the safe summary shape (no hash, no lockout internals).
    pub fn summary(&self) -> IdentitySummary {
        IdentitySummary {
            id: self.identity_id,
            username: self.username.clone(),
            role_id: self.role_id,
        }
    }
}

/// Identity representation embedded in login responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IdentitySummary {
    pub id: Uuid,
    pub username: String,
    pub role_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_active_code_is_active() {
        assert_eq!(AccountStatus::from_code("active"), AccountStatus::Active);
    }

    // Pins the status-comparison decision: anything but the exact lowercase
    // code is Inactive, so a mistyped or legacy flag can never grant access.
    #[test]
    fn unrecognized_codes_are_inactive() {
        for code in ["Active", "ACTIVE", "", "1", "enabled", "inactive"] {
            assert_eq!(AccountStatus::from_code(code), AccountStatus::Inactive);
        }
    }

    #[test]
    fn new_identity_starts_clean() {
        let identity = Identity::new("amara".to_string(), "$argon2id$x".to_string(), Uuid::new_v4());
        assert!(identity.is_active());
        assert_eq!(identity.failed_attempts, 0);
        assert!(identity.locked_until.is_none());
    }
}
