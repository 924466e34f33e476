//! Menu item model - the flat navigation records the permission resolver
//! assembles into a role-scoped tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Menu item entity.
///
/// Each row references its parent by id (null for roots), so the full set
/// forms a tree. A requesting role may see an item when its rank is at or
/// above `required_rank`, or when it holds `required_capability`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MenuItem {
    pub menu_item_id: Uuid,
    pub parent_menu_item_id: Option<Uuid>,
    pub item_label: String,
    pub route_name: String,
    pub required_rank: i32,
    pub required_capability: Option<String>,
    pub display_order: i32,
    pub created_utc: DateTime<Utc>,
}

impl MenuItem {
    /// Create a new menu item (rank-gated, no capability override).
    pub fn new(
        parent_menu_item_id: Option<Uuid>,
        item_label: String,
        route_name: String,
        required_rank: i32,
        display_order: i32,
    ) -> Self {
        Self {
            menu_item_id: Uuid::new_v4(),
            parent_menu_item_id,
            item_label,
            route_name,
            required_rank,
            required_capability: None,
            display_order,
            created_utc: Utc::now(),
        }
    }

    /// Also grant this item to roles holding the named capability.
    pub fn with_capability(mut self, cap_key: &str) -> Self {
        self.required_capability = Some(cap_key.to_string());
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_menu_item_id.is_none()
    }
}

/// Resolved tree node returned by the menu endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MenuTreeNode {
    pub id: Uuid,
    pub label: String,
    pub route: String,
    pub children: Vec<MenuTreeNode>,
}
