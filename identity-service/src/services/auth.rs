//! Authentication orchestration.
//!
//! Ties together the credential store, the lockout policy, password
//! verification, and session-token issuance. Expected login outcomes are
//! values, not errors; only collaborator failures (store unreachable)
//! surface as `ServiceError`.

use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::models::IdentitySummary;
use crate::services::{JwtService, LockoutDecision, LockoutPolicy, ServiceError};
use crate::store::CredentialStore;
use crate::utils::{verify_password, Password, PasswordHashString};

/// Bound on compare-and-set retries for the lockout counter. Conflicts are
/// transient (another failure advanced the counter), so exhaustion means the
/// store is misbehaving and is reported rather than under-counted.
const MAX_LOCKOUT_UPDATE_RETRIES: usize = 8;

/// Result of a login attempt.
///
/// Unknown usernames and wrong passwords collapse into the same
/// `InvalidCredentials` value so callers cannot enumerate accounts.
#[derive(Debug)]
pub enum LoginOutcome {
    Success {
        token: String,
        identity: IdentitySummary,
    },
    InvalidCredentials,
    Locked {
        retry_after: Duration,
    },
    Inactive,
}

/// Outcome of an administrative unlock.
#[derive(Debug, Clone)]
pub struct UnlockReport {
    pub username: String,
    /// Counter value before the reset (0 when the action was a no-op).
    pub cleared_attempts: i32,
    /// Whether an unexpired lock stood at the time of the reset.
    pub was_locked: bool,
}

#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    jwt: JwtService,
    lockout: LockoutPolicy,
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        jwt: JwtService,
        lockout: LockoutPolicy,
    ) -> Self {
        Self {
            credentials,
            jwt,
            lockout,
        }
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, ServiceError> {
        let Some(identity) = self.credentials.find_by_username(username).await? else {
            tracing::debug!("Login attempt for unknown username");
            return Ok(LoginOutcome::InvalidCredentials);
        };

        let now = Utc::now();
        if let LockoutDecision::Locked { remaining } = self.lockout.evaluate(&identity, now) {
            tracing::info!(identity_id = %identity.identity_id, "Login denied: account locked");
            return Ok(LoginOutcome::Locked {
                retry_after: remaining,
            });
        }

        let supplied = Password::new(password.to_string());
        let stored = PasswordHashString::new(identity.password_hash.clone());
        if verify_password(&supplied, &stored).is_err() {
            self.record_failure(&identity).await?;
            return Ok(LoginOutcome::InvalidCredentials);
        }

        if !identity.is_active() {
            // Not a successful login: the lockout counter is left untouched.
            tracing::info!(identity_id = %identity.identity_id, "Login denied: account inactive");
            return Ok(LoginOutcome::Inactive);
        }

        if identity.failed_attempts > 0 || identity.locked_until.is_some() {
            self.credentials.reset_lockout(identity.identity_id).await?;
        }

        let token = self
            .jwt
            .issue_session_token(&identity)
            .map_err(ServiceError::Internal)?;

        tracing::info!(identity_id = %identity.identity_id, "Login succeeded");
        Ok(LoginOutcome::Success {
            identity: identity.summary(),
            token,
        })
    }

    /// Administrative unlock: reset the counter and clear any lock. Safe to
    /// repeat; a second call reports zero cleared attempts.
    pub async fn unlock(&self, username: &str) -> Result<UnlockReport, ServiceError> {
        let Some(identity) = self.credentials.find_by_username(username).await? else {
            return Err(ServiceError::IdentityNotFound);
        };

        let now = Utc::now();
        let was_locked = identity.locked_until.is_some_and(|until| until > now);

        self.credentials.reset_lockout(identity.identity_id).await?;

        tracing::info!(identity_id = %identity.identity_id, "Administrative unlock");
        Ok(UnlockReport {
            username: identity.username,
            cleared_attempts: identity.failed_attempts,
            was_locked,
        })
    }

    /// Record a failed verification through the store's conditional update.
    /// A conflict means another attempt advanced the counter concurrently;
    /// re-read and recompute so no increment is lost.
    async fn record_failure(
        &self,
        identity: &crate::models::Identity,
    ) -> Result<(), ServiceError> {
        let mut current = identity.clone();

        for _ in 0..MAX_LOCKOUT_UPDATE_RETRIES {
            let now = Utc::now();
            let update = self.lockout.on_failure(&current, now);
            let applied = self
                .credentials
                .apply_lockout_if_unchanged(current.identity_id, current.failed_attempts, update)
                .await?;

            if applied {
                if update.locked_until.is_some() && current.locked_until.is_none() {
                    tracing::warn!(
                        identity_id = %current.identity_id,
                        failed_attempts = update.failed_attempts,
                        "Account locked after repeated failures"
                    );
                }
                return Ok(());
            }

            match self.credentials.find_by_username(&current.username).await? {
                Some(fresh) => current = fresh,
                // Deleted out from under us; nothing left to count against.
                None => return Ok(()),
            }
        }

        Err(ServiceError::Internal(anyhow::anyhow!(
            "Lockout counter update exhausted retries"
        )))
    }
}
