//! Role-scoped menu resolution.
//!
//! Rebuilds the tree from the flat menu definition on every request; role
//! assignments can change between requests and a cached tree could grant
//! stale access.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{MenuItem, MenuTreeNode, Role};
use crate::services::ServiceError;
use crate::store::DirectoryStore;

#[derive(Clone)]
pub struct MenuService {
    directory: Arc<dyn DirectoryStore>,
}

impl MenuService {
    pub fn new(directory: Arc<dyn DirectoryStore>) -> Self {
        Self { directory }
    }

    /// Resolve the menu tree visible to a role.
    ///
    /// A role id that no longer exists (a token can outlive its role)
    /// resolves to the empty sequence, never to an error or a grant.
    pub async fn menu_for_role(&self, role_id: Uuid) -> Result<Vec<MenuTreeNode>, ServiceError> {
        let Some(role) = self.directory.find_role_by_id(role_id).await? else {
            tracing::warn!(%role_id, "Menu requested for unknown role");
            return Ok(Vec::new());
        };

        let capabilities: HashSet<String> = self
            .directory
            .list_role_capabilities(role_id)
            .await?
            .into_iter()
            .collect();
        let items = self.directory.list_menu_items().await?;

        Ok(resolve_menu(&role, &capabilities, items))
    }
}

/// Whether a role may see a menu item: either its rank suffices, or it holds
/// the item's capability. Children get no implicit access from a visible
/// parent; every item is judged on its own declaration.
fn permits(role: &Role, capabilities: &HashSet<String>, item: &MenuItem) -> bool {
    if role.outranks(item.required_rank) {
        return true;
    }
    item.required_capability
        .as_deref()
        .is_some_and(|cap| capabilities.contains(cap))
}

/// Build the role-scoped tree from the flat item collection.
///
/// Authorized items form an arena indexed by position; parent/child links are
/// stored as indices into it, so the assembly needs no ownership cycles. An
/// authorized item whose parent was filtered out is unreachable from any root
/// and is dropped. Each level is ordered by (display_order, id) so the result
/// is deterministic for a fixed role and definition set.
pub fn resolve_menu(
    role: &Role,
    capabilities: &HashSet<String>,
    items: Vec<MenuItem>,
) -> Vec<MenuTreeNode> {
    let arena: Vec<MenuItem> = items
        .into_iter()
        .filter(|item| permits(role, capabilities, item))
        .collect();

    let index: HashMap<Uuid, usize> = arena
        .iter()
        .enumerate()
        .map(|(idx, item)| (item.menu_item_id, idx))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); arena.len()];
    let mut roots: Vec<usize> = Vec::new();

    for (idx, item) in arena.iter().enumerate() {
        match item.parent_menu_item_id {
            None => roots.push(idx),
            Some(parent_id) => {
                if let Some(&parent_idx) = index.get(&parent_id) {
                    children[parent_idx].push(idx);
                }
            }
        }
    }

    roots.sort_by_key(|&idx| (arena[idx].display_order, arena[idx].menu_item_id));
    for list in children.iter_mut() {
        list.sort_by_key(|&idx| (arena[idx].display_order, arena[idx].menu_item_id));
    }

    roots
        .iter()
        .map(|&idx| materialize(idx, &arena, &children))
        .collect()
}

fn materialize(idx: usize, arena: &[MenuItem], children: &[Vec<usize>]) -> MenuTreeNode {
    let item = &arena[idx];
    MenuTreeNode {
        id: item.menu_item_id,
        label: item.item_label.clone(),
        route: item.route_name.clone(),
        children: children[idx]
            .iter()
            .map(|&child_idx| materialize(child_idx, arena, children))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(rank: i32) -> Role {
        Role::new(format!("rank-{rank}"), rank)
    }

    fn no_caps() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn supervisor_sees_only_nodes_at_or_below_its_privilege() {
        let settings = MenuItem::new(None, "Settings".into(), "settings".into(), 1, 1);
        let dashboard = MenuItem::new(None, "Dashboard".into(), "dashboard".into(), 3, 2);
        let supervisor = role(3);

        let tree = resolve_menu(&supervisor, &no_caps(), vec![settings, dashboard.clone()]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, dashboard.menu_item_id);
        assert_eq!(tree[0].label, "Dashboard");
        assert_eq!(tree[0].route, "dashboard");
    }

    #[test]
    fn capability_grants_an_item_the_rank_would_deny() {
        let reports = MenuItem::new(None, "Reports".into(), "reports".into(), 1, 1)
            .with_capability("hr.report:view");
        let clerk = role(5);
        let caps: HashSet<String> = ["hr.report:view".to_string()].into_iter().collect();

        assert_eq!(resolve_menu(&clerk, &no_caps(), vec![reports.clone()]).len(), 0);
        assert_eq!(resolve_menu(&clerk, &caps, vec![reports]).len(), 1);
    }

    #[test]
    fn children_are_filtered_independently_of_their_parent() {
        let parent = MenuItem::new(None, "Employees".into(), "employees".into(), 5, 1);
        let visible_child = MenuItem::new(
            Some(parent.menu_item_id),
            "Directory".into(),
            "employees.directory".into(),
            5,
            1,
        );
        let admin_child = MenuItem::new(
            Some(parent.menu_item_id),
            "Salary Bands".into(),
            "employees.salary".into(),
            1,
            2,
        );
        let supervisor = role(3);

        let tree = resolve_menu(
            &supervisor,
            &no_caps(),
            vec![parent, visible_child.clone(), admin_child],
        );

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].id, visible_child.menu_item_id);
    }

    // Pruning applies to authorization only: an authorized parent whose
    // children were all filtered out stays, even without useful children.
    #[test]
    fn childless_authorized_parent_is_kept() {
        let parent = MenuItem::new(None, "Admin".into(), "admin".into(), 3, 1);
        let child = MenuItem::new(
            Some(parent.menu_item_id),
            "Audit".into(),
            "admin.audit".into(),
            1,
            1,
        );
        let supervisor = role(3);

        let tree = resolve_menu(&supervisor, &no_caps(), vec![parent.clone(), child]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, parent.menu_item_id);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn authorized_child_of_filtered_parent_is_dropped() {
        let parent = MenuItem::new(None, "System".into(), "system".into(), 1, 1);
        let child = MenuItem::new(
            Some(parent.menu_item_id),
            "Profile".into(),
            "system.profile".into(),
            5,
            1,
        );
        let clerk = role(5);

        let tree = resolve_menu(&clerk, &no_caps(), vec![parent, child]);
        assert!(tree.is_empty());
    }

    #[test]
    fn levels_are_ordered_by_display_order() {
        let root = MenuItem::new(None, "Root".into(), "root".into(), 9, 1);
        let second = MenuItem::new(
            Some(root.menu_item_id),
            "Second".into(),
            "root.second".into(),
            9,
            2,
        );
        let first = MenuItem::new(
            Some(root.menu_item_id),
            "First".into(),
            "root.first".into(),
            9,
            1,
        );
        let admin = role(1);

        // Insertion order deliberately differs from display order.
        let tree = resolve_menu(&admin, &no_caps(), vec![root, second, first]);
        let labels: Vec<&str> = tree[0].children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["First", "Second"]);
    }

    #[test]
    fn resolution_is_deterministic() {
        let root_a = MenuItem::new(None, "A".into(), "a".into(), 5, 1);
        let root_b = MenuItem::new(None, "B".into(), "b".into(), 5, 2);
        let child = MenuItem::new(Some(root_a.menu_item_id), "C".into(), "a.c".into(), 5, 1);
        let items = vec![root_a, root_b, child];
        let requester = role(2);

        let first = resolve_menu(&requester, &no_caps(), items.clone());
        let second = resolve_menu(&requester, &no_caps(), items);
        assert_eq!(first, second);
    }

    #[test]
    fn role_with_no_matching_nodes_yields_empty_sequence() {
        let settings = MenuItem::new(None, "Settings".into(), "settings".into(), 1, 1);
        let clerk = role(9);

        assert!(resolve_menu(&clerk, &no_caps(), vec![settings]).is_empty());
        assert!(resolve_menu(&clerk, &no_caps(), Vec::new()).is_empty());
    }
}
