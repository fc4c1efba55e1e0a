//! Name scopes: per-subtree namespaces resolving names to controls.
//!
//! A control registers its name in the nearest enclosing scope when it gains a
//! logical parent and unregisters when it loses it. The registration cascades
//! to its named logical descendants, stopping at descendants that own a scope
//! of their own.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Result, TreeError};
use crate::logging::targets;

use super::control::ControlId;
use super::ControlTree;

// ---------------------------------------------------------------------------
// NameDictionary
// ---------------------------------------------------------------------------

/// Name to control mapping enforcing uniqueness.
#[derive(Debug, Default, Clone)]
pub struct NameDictionary {
    entries: HashMap<String, ControlId>,
}

impl NameDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [`TreeError::DuplicateName`] if `name` is already present.
    pub fn insert(&mut self, name: &str, id: ControlId) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(TreeError::DuplicateName(name.to_string()));
        }
        self.entries.insert(name.to_string(), id);
        Ok(())
    }

    /// Fails with [`TreeError::NameNotFound`] if `name` is absent.
    pub fn remove(&mut self, name: &str) -> Result<ControlId> {
        self.entries
            .remove(name)
            .ok_or_else(|| TreeError::NameNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<ControlId> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }
}

// ---------------------------------------------------------------------------
// NameScope
// ---------------------------------------------------------------------------

/// Shared handle to a [`NameDictionary`].
///
/// Cloning shares the dictionary; the owning control and template hooks see
/// the same registrations.
#[derive(Debug, Clone, Default)]
pub struct NameScope {
    dictionary: Rc<RefCell<NameDictionary>>,
}

impl NameScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &str, id: ControlId) -> Result<()> {
        tracing::trace!(target: targets::NAMES, name, ?id, "register");
        self.dictionary.borrow_mut().insert(name, id)
    }

    pub fn unregister(&self, name: &str) -> Result<()> {
        tracing::trace!(target: targets::NAMES, name, "unregister");
        self.dictionary.borrow_mut().remove(name).map(|_| ())
    }

    /// Non-failing lookup.
    pub fn find(&self, name: &str) -> Option<ControlId> {
        self.dictionary.borrow().get(name)
    }

    /// Lookup failing with [`TreeError::KeyNotFound`] on a miss.
    pub fn get(&self, name: &str) -> Result<ControlId> {
        self.find(name)
            .ok_or_else(|| TreeError::KeyNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        self.dictionary.borrow().names()
    }

    pub fn len(&self) -> usize {
        self.dictionary.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionary.borrow().is_empty()
    }

    /// Whether both handles share one dictionary.
    pub fn same_scope(&self, other: &NameScope) -> bool {
        Rc::ptr_eq(&self.dictionary, &other.dictionary)
    }
}

// ---------------------------------------------------------------------------
// Tree integration
// ---------------------------------------------------------------------------

impl ControlTree {
    /// The scope owned by `id`, if it owns one.
    pub fn name_scope(&self, id: ControlId) -> Option<NameScope> {
        self.nodes.get(id)?.name_scope.clone()
    }

    /// The first scope found on `id` or its logical ancestors.
    pub fn find_name_scope(&self, id: ControlId) -> Option<NameScope> {
        let mut current = Some(id);
        while let Some(cid) = current {
            let node = self.nodes.get(cid)?;
            if let Some(scope) = &node.name_scope {
                return Some(scope.clone());
            }
            current = node.logical_parent;
        }
        None
    }

    /// Resolve `name` in the scope enclosing `from`.
    pub fn find_control(&self, from: ControlId, name: &str) -> Option<ControlId> {
        self.find_name_scope(from)?.find(name)
    }

    /// Give `id` its own scope (if it has none) and register `id` plus its
    /// named logical descendants in it.
    pub(crate) fn install_name_scope(&mut self, id: ControlId) -> Result<NameScope> {
        let node = self.node(id)?;
        if let Some(scope) = &node.name_scope {
            return Ok(scope.clone());
        }
        let scope = NameScope::new();
        self.node_mut(id)?.name_scope = Some(scope.clone());
        self.register_subtree(&scope, id)?;
        Ok(scope)
    }

    /// Register `id`'s name and the names of its logical descendants.
    ///
    /// All or nothing: a duplicate anywhere in the subtree fails before any
    /// name is registered.
    pub(crate) fn register_subtree(&self, scope: &NameScope, id: ControlId) -> Result<()> {
        let entries = self.named_subtree(id)?;
        for (i, (name, _)) in entries.iter().enumerate() {
            if scope.find(name).is_some() || entries[..i].iter().any(|(n, _)| n == name) {
                return Err(TreeError::DuplicateName(name.clone()));
            }
        }
        for (name, cid) in &entries {
            scope.register(name, *cid)?;
        }
        Ok(())
    }

    /// Mirror of [`register_subtree`](Self::register_subtree).
    pub(crate) fn unregister_subtree(&self, scope: &NameScope, id: ControlId) -> Result<()> {
        let entries = self.named_subtree(id)?;
        if let Some((name, _)) = entries.iter().find(|(n, cid)| scope.find(n) != Some(*cid)) {
            return Err(TreeError::NameNotFound(name.clone()));
        }
        for (name, _) in &entries {
            scope.unregister(name)?;
        }
        Ok(())
    }

    /// `id` and every named logical descendant that does not sit behind a
    /// nested scope owner.
    fn named_subtree(&self, id: ControlId) -> Result<Vec<(String, ControlId)>> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cid) = stack.pop() {
            let node = self.node(cid)?;
            if let Some(name) = &node.name {
                out.push((name.clone(), cid));
            }
            for &child in node.own_logical_children().iter().rev() {
                let Some(child_node) = self.nodes.get(child) else {
                    continue;
                };
                if child_node.logical_parent == Some(cid) && child_node.name_scope.is_none() {
                    stack.push(child);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{types, Control};

    #[test]
    fn dictionary_rejects_duplicates_and_missing() {
        let mut tree = ControlTree::new();
        let a = tree.insert(Control::new(&types::BORDER));
        let mut dict = NameDictionary::new();
        dict.insert("a", a).unwrap();
        assert_eq!(dict.insert("a", a), Err(TreeError::DuplicateName("a".into())));
        assert_eq!(dict.remove("a"), Ok(a));
        assert_eq!(dict.remove("a"), Err(TreeError::NameNotFound("a".into())));
    }

    #[test]
    fn find_versus_get() {
        let mut tree = ControlTree::new();
        let a = tree.insert(Control::new(&types::BORDER));
        let scope = NameScope::new();
        scope.register("a", a).unwrap();
        assert_eq!(scope.find("a"), Some(a));
        assert_eq!(scope.find("b"), None);
        assert_eq!(scope.get("a"), Ok(a));
        assert_eq!(scope.get("b"), Err(TreeError::KeyNotFound("b".into())));
    }

    #[test]
    fn clones_share_registrations() {
        let mut tree = ControlTree::new();
        let a = tree.insert(Control::new(&types::BORDER));
        let scope = NameScope::new();
        let other = scope.clone();
        scope.register("a", a).unwrap();
        assert_eq!(other.find("a"), Some(a));
        assert!(scope.same_scope(&other));
        assert!(!scope.same_scope(&NameScope::new()));
    }

    #[test]
    fn scope_owner_registers_own_name() {
        let mut tree = ControlTree::new();
        let host = tree.insert(
            Control::new(&types::USER_CONTROL)
                .with_name("host")
                .with_name_scope(),
        );
        let scope = tree.name_scope(host).unwrap();
        assert_eq!(scope.find("host"), Some(host));
    }

    #[test]
    fn logical_attach_registers_and_detach_unregisters() {
        let mut tree = ControlTree::new();
        let host = tree.insert(Control::new(&types::USER_CONTROL).with_name_scope());
        let panel = tree.insert(Control::new(&types::STACK_PANEL).with_name("panel"));
        let child = tree.insert(Control::new(&types::BORDER).with_name("child"));
        tree.add_logical_child(panel, child).unwrap();

        tree.add_logical_child(host, panel).unwrap();
        let scope = tree.name_scope(host).unwrap();
        assert_eq!(scope.names(), vec!["child", "panel"]);
        assert_eq!(tree.find_control(child, "panel"), Some(panel));

        tree.remove_logical_child(host, panel).unwrap();
        assert!(scope.is_empty());
        assert_eq!(tree.logical_parent(panel), None);
    }

    #[test]
    fn cascade_stops_at_nested_scope_owner() {
        let mut tree = ControlTree::new();
        let outer = tree.insert(Control::new(&types::USER_CONTROL).with_name_scope());
        let inner = tree.insert(
            Control::new(&types::USER_CONTROL)
                .with_name("inner")
                .with_name_scope(),
        );
        let leaf = tree.insert(Control::new(&types::BORDER).with_name("leaf"));
        tree.add_logical_child(inner, leaf).unwrap();
        tree.add_logical_child(outer, inner).unwrap();

        let outer_scope = tree.name_scope(outer).unwrap();
        let inner_scope = tree.name_scope(inner).unwrap();
        assert!(outer_scope.is_empty());
        assert_eq!(inner_scope.names(), vec!["inner", "leaf"]);
    }
}
