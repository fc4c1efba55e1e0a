//! Tree queries: ancestor chains, descendants by type, class or name.

use super::control::ControlId;
use super::control_tree::ControlTree;
use super::types::ControlType;

impl ControlTree {
    /// Visual ancestors of `id`, nearest first. Does not include `id`.
    pub fn visual_ancestors(&self, id: ControlId) -> Vec<ControlId> {
        let mut result = Vec::new();
        let mut current = self.visual_parent(id);
        while let Some(p) = current {
            result.push(p);
            current = self.visual_parent(p);
        }
        result
    }

    /// Logical ancestors of `id`, nearest first. Does not include `id`.
    pub fn logical_ancestors(&self, id: ControlId) -> Vec<ControlId> {
        let mut result = Vec::new();
        let mut current = self.logical_parent(id);
        while let Some(p) = current {
            if result.contains(&p) {
                break;
            }
            result.push(p);
            current = self.logical_parent(p);
        }
        result
    }

    /// The visual root `id` hangs from, if it is attached.
    pub fn visual_root(&self, id: ControlId) -> Option<ControlId> {
        if !self.is_attached(id) {
            return None;
        }
        let root = self.visual_ancestors(id).last().copied().unwrap_or(id);
        self.is_root(root).then_some(root)
    }

    /// Visual descendants of `id` (excluding `id`) whose type is-a `ty`.
    pub fn query_by_type(&self, id: ControlId, ty: &ControlType) -> Vec<ControlId> {
        self.query_all(id, |tree, cid| {
            tree.control_type(cid).is_some_and(|t| t.is_a(ty))
        })
    }

    /// Visual descendants of `id` (excluding `id`) carrying `class`.
    pub fn query_by_class(&self, id: ControlId, class: &str) -> Vec<ControlId> {
        self.query_all(id, |tree, cid| {
            tree.classes(cid).is_some_and(|c| c.contains(class))
        })
    }

    /// First visual descendant of `id` named `name`, ignoring name scopes.
    pub fn query_by_name(&self, id: ControlId, name: &str) -> Option<ControlId> {
        self.query_all(id, |tree, cid| tree.name(cid) == Some(name))
            .into_iter()
            .next()
    }

    /// Visual descendants of `id` (excluding `id`) matching a predicate, in
    /// pre-order.
    pub fn query_all(
        &self,
        id: ControlId,
        predicate: impl Fn(&ControlTree, ControlId) -> bool,
    ) -> Vec<ControlId> {
        self.visual_subtree(id)
            .into_iter()
            .skip(1)
            .filter(|&cid| predicate(self, cid))
            .collect()
    }
}
