//! Role model - privilege ranks with capability mappings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role entity.
///
/// `rank` orders privilege: a lower numeric value is MORE privileged
/// (rank 1 administrators outrank rank 3 supervisors).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub role_id: Uuid,
    pub role_label: String,
    pub rank: i32,
    pub created_utc: DateTime<Utc>,
}

impl Role {
    /// Create a new role.
    pub fn new(role_label: String, rank: i32) -> Self {
        Self {
            role_id: Uuid::new_v4(),
            role_label,
            rank,
            created_utc: Utc::now(),
        }
    }

    /// Whether this role is at least as privileged as `required_rank`.
    pub fn outranks(&self, required_rank: i32) -> bool {
        self.rank <= required_rank
    }
}

/// Role capability mapping row.
#[derive(Debug, Clone, FromRow)]
pub struct RoleCapability {
    pub role_id: Uuid,
    pub cap_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_rank_outranks_higher() {
        let admin = Role::new("Administrator".to_string(), 1);
        assert!(admin.outranks(1));
        assert!(admin.outranks(3));

        let supervisor = Role::new("Supervisor".to_string(), 3);
        assert!(supervisor.outranks(3));
        assert!(!supervisor.outranks(1));
    }
}
