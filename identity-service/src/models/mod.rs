//! Data models for the identity service.

mod identity;
mod menu_item;
mod role;

pub use identity::{AccountStatus, Identity, IdentitySummary};
pub use menu_item::{MenuItem, MenuTreeNode};
pub use role::{Role, RoleCapability};
