//! The control arena: insertion, visual and logical parent links, removal.

use std::collections::HashSet;

use slotmap::SlotMap;

use crate::config::TreeConfig;
use crate::error::{ParentKind, Result, TreeError};
use crate::logging::targets;
use crate::reactive::{SignalId, Subscription};
use crate::template::IS_PRESENTER;

use super::classes::Classes;
use super::control::{Control, ControlId, ControlNode, LogicalChildren};
use super::lifecycle::{LifecycleEvent, LifecycleTracker};
use super::types::ControlType;

/// Empty slice returned when a control has no children or does not exist.
const EMPTY_CHILDREN: &[ControlId] = &[];

/// A tree of controls with independent visual and logical parent links.
///
/// All controls live in one `SlotMap`. Each control always owns an ordered
/// list of visual children; its logical children are either its own
/// collection or, after reparenting, the collection of another control.
pub struct ControlTree {
    pub(crate) nodes: SlotMap<ControlId, ControlNode>,
    config: TreeConfig,
    lifecycle: LifecycleTracker,
}

impl ControlTree {
    /// Create an empty tree with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        let lifecycle = if config.record_lifecycle {
            LifecycleTracker::new()
        } else {
            LifecycleTracker::silent()
        };
        Self {
            nodes: SlotMap::with_key(),
            config,
            lifecycle,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> &LifecycleTracker {
        &self.lifecycle
    }

    pub(crate) fn lifecycle_mut(&mut self) -> &mut LifecycleTracker {
        &mut self.lifecycle
    }

    /// Drain the queued lifecycle events.
    pub fn take_lifecycle_events(&mut self) -> Vec<LifecycleEvent> {
        self.lifecycle.pending_events()
    }

    // -----------------------------------------------------------------------
    // Node access
    // -----------------------------------------------------------------------

    pub(crate) fn node(&self, id: ControlId) -> Result<&ControlNode> {
        self.nodes.get(id).ok_or(TreeError::InvalidControl(id))
    }

    pub(crate) fn node_mut(&mut self, id: ControlId) -> Result<&mut ControlNode> {
        self.nodes.get_mut(id).ok_or(TreeError::InvalidControl(id))
    }

    /// Insert a control. Roots are attached (and styled) immediately.
    pub fn insert(&mut self, control: Control) -> ControlId {
        let presenter = control.presenter;
        let root = control.root;
        let id = self.nodes.insert(ControlNode::new(control));
        let node = &self.nodes[id];
        if let (Some(scope), Some(name)) = (&node.name_scope, &node.name) {
            // Fresh scope, cannot collide.
            let _ = scope.register(name, id);
        }
        if presenter {
            node.slot_or_insert(IS_PRESENTER.key()).set(true);
        }
        tracing::trace!(target: targets::TREE, ?id, ty = %node.control_type, "insert");
        if root {
            self.attach_subtree(id);
        }
        id
    }

    pub fn contains(&self, id: ControlId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn control_type(&self, id: ControlId) -> Option<&'static ControlType> {
        self.nodes.get(id).map(|n| n.control_type)
    }

    pub fn style_key(&self, id: ControlId) -> Option<&'static ControlType> {
        self.nodes.get(id).map(|n| n.style_key)
    }

    pub fn name(&self, id: ControlId) -> Option<&str> {
        self.nodes.get(id)?.name.as_deref()
    }

    pub fn classes(&self, id: ControlId) -> Option<Classes> {
        self.nodes.get(id).map(|n| n.classes)
    }

    pub fn is_attached(&self, id: ControlId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.attached)
    }

    pub fn is_root(&self, id: ControlId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.is_root)
    }

    // -----------------------------------------------------------------------
    // Visual tree
    // -----------------------------------------------------------------------

    pub fn visual_parent(&self, id: ControlId) -> Option<ControlId> {
        self.nodes.get(id)?.visual_parent
    }

    pub fn visual_children(&self, id: ControlId) -> &[ControlId] {
        self.nodes
            .get(id)
            .map(|n| n.visual_children.as_slice())
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Append `child` to `parent`'s visual children.
    pub fn add_visual_child(&mut self, parent: ControlId, child: ControlId) -> Result<()> {
        let index = self.node(parent)?.visual_children.len();
        self.insert_visual_child(parent, index, child)
    }

    /// Insert `child` at `index` (clamped) in `parent`'s visual children.
    ///
    /// Re-adding a child to its current parent is a no-op. A child with a
    /// different visual parent fails with [`TreeError::AlreadyParented`].
    pub fn insert_visual_child(
        &mut self,
        parent: ControlId,
        index: usize,
        child: ControlId,
    ) -> Result<()> {
        self.node(parent)?;
        match self.node(child)?.visual_parent {
            Some(current) if current == parent => return Ok(()),
            Some(_) => {
                return Err(TreeError::AlreadyParented {
                    control: child,
                    kind: ParentKind::Visual,
                })
            }
            None => {}
        }

        let parent_node = self.node_mut(parent)?;
        let index = index.min(parent_node.visual_children.len());
        parent_node.visual_children.insert(index, child);
        let attached = parent_node.attached;
        self.node_mut(child)?.visual_parent = Some(parent);
        self.invalidate_measure(parent);

        if attached {
            self.attach_subtree(child);
        }
        Ok(())
    }

    /// Remove `child` from `parent`'s visual children, detaching it.
    ///
    /// Returns `false` if `child` was not a visual child of `parent`.
    pub fn remove_visual_child(&mut self, parent: ControlId, child: ControlId) -> Result<bool> {
        if self.node(child)?.visual_parent != Some(parent) {
            return Ok(false);
        }
        self.node_mut(parent)?.visual_children.retain(|&c| c != child);
        self.node_mut(child)?.visual_parent = None;
        self.invalidate_measure(parent);
        self.detach_subtree(child);
        Ok(true)
    }

    pub fn clear_visual_children(&mut self, parent: ControlId) -> Result<()> {
        let children = self.node(parent)?.visual_children.clone();
        for child in children {
            self.remove_visual_child(parent, child)?;
        }
        Ok(())
    }

    /// Mark `id` and its unattached visual descendants attached, recording
    /// lifecycle events and applying styles in pre-order.
    fn attach_subtree(&mut self, id: ControlId) {
        let mut stack = vec![id];
        while let Some(cid) = stack.pop() {
            let Some(node) = self.nodes.get_mut(cid) else {
                continue;
            };
            if node.attached {
                continue;
            }
            node.attached = true;
            stack.extend(node.visual_children.iter().rev().copied());
            self.lifecycle.on_attach(cid);
            tracing::trace!(target: targets::TREE, id = ?cid, "attached to visual tree");
            self.apply_styles(cid);
        }
    }

    /// Mirror of `attach_subtree`: drops style subscriptions and clears the
    /// style layers of every attached control in the subtree.
    fn detach_subtree(&mut self, id: ControlId) {
        for cid in self.visual_subtree(id) {
            let Some(node) = self.nodes.get_mut(cid) else {
                continue;
            };
            if !node.attached {
                continue;
            }
            node.attached = false;
            let subscriptions = std::mem::take(&mut node.style_subscriptions);
            let slots: Vec<_> = node.properties.get_mut().values().copied().collect();
            self.lifecycle.on_detach(cid);
            tracing::trace!(target: targets::TREE, id = ?cid, "detached from visual tree");
            drop(subscriptions);
            for slot in slots {
                slot.clear_styles();
            }
        }
    }

    /// `id` and its visual descendants, pre-order.
    pub fn visual_subtree(&self, id: ControlId) -> Vec<ControlId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cid) = stack.pop() {
            let Some(node) = self.nodes.get(cid) else {
                continue;
            };
            out.push(cid);
            stack.extend(node.visual_children.iter().rev().copied());
        }
        out
    }

    // -----------------------------------------------------------------------
    // Logical tree
    // -----------------------------------------------------------------------

    pub fn logical_parent(&self, id: ControlId) -> Option<ControlId> {
        self.nodes.get(id)?.logical_parent
    }

    /// The logical children of `id`.
    ///
    /// Reading a control's own collection materializes it: reparenting that
    /// control afterwards fails with [`TreeError::ReparentingTooLate`].
    pub fn logical_children(&self, id: ControlId) -> Vec<ControlId> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        match &node.logical {
            LogicalChildren::Default {
                children,
                enumerated,
            } => {
                enumerated.set(true);
                children.clone()
            }
            LogicalChildren::External(owner) => self.logical_children_raw(*owner),
        }
    }

    /// Logical children without materializing anything.
    pub(crate) fn logical_children_raw(&self, id: ControlId) -> Vec<ControlId> {
        let owner = self.collection_owner(id);
        self.nodes
            .get(owner)
            .map(|n| n.own_logical_children().to_vec())
            .unwrap_or_default()
    }

    /// The control whose own collection backs `id`'s logical children.
    fn collection_owner(&self, id: ControlId) -> ControlId {
        let mut current = id;
        let mut seen = HashSet::new();
        while let Some(LogicalChildren::External(owner)) =
            self.nodes.get(current).map(|n| &n.logical)
        {
            if !seen.insert(current) {
                break;
            }
            current = *owner;
        }
        current
    }

    /// Set or clear the logical parent of `child`.
    ///
    /// Non-null to a different non-null fails with
    /// [`TreeError::AlreadyParented`]; setting the current parent again is a
    /// no-op. Gaining a parent registers `child` and its named logical
    /// descendants in the nearest enclosing name scope; losing it unregisters
    /// them.
    pub fn set_logical_parent(
        &mut self,
        child: ControlId,
        parent: Option<ControlId>,
    ) -> Result<()> {
        let old = self.node(child)?.logical_parent;
        if let Some(p) = parent {
            self.node(p)?;
        }
        match (old, parent) {
            (Some(a), Some(b)) if a == b => Ok(()),
            (Some(_), Some(_)) => Err(TreeError::AlreadyParented {
                control: child,
                kind: ParentKind::Logical,
            }),
            (None, None) => Ok(()),
            (None, Some(p)) => {
                if self.node(child)?.name_scope.is_none() {
                    if let Some(scope) = self.find_name_scope(p) {
                        self.register_subtree(&scope, child)?;
                    }
                }
                self.node_mut(child)?.logical_parent = Some(p);
                tracing::trace!(target: targets::TREE, ?child, parent = ?p, "logical parent set");
                Ok(())
            }
            (Some(p), None) => {
                if self.node(child)?.name_scope.is_none() {
                    if let Some(scope) = self.find_name_scope(p) {
                        self.unregister_subtree(&scope, child)?;
                    }
                }
                self.node_mut(child)?.logical_parent = None;
                tracing::trace!(
                    target: targets::TREE,
                    ?child,
                    parent = ?p,
                    "logical parent cleared"
                );
                Ok(())
            }
        }
    }

    /// Parent `child` logically under `parent` and append it to the logical
    /// collection backing `parent`.
    ///
    /// If `parent` was reparented, `child` gets the redirected logical parent
    /// and lands in the external collection.
    pub fn add_logical_child(&mut self, parent: ControlId, child: ControlId) -> Result<()> {
        let logical_parent = self.node(parent)?.child_logical_parent.unwrap_or(parent);
        let owner = self.collection_owner(parent);
        self.set_logical_parent(child, Some(logical_parent))?;
        if let LogicalChildren::Default { children, .. } = &mut self.node_mut(owner)?.logical {
            if !children.contains(&child) {
                children.push(child);
            }
        }
        Ok(())
    }

    /// Undo [`add_logical_child`](Self::add_logical_child).
    pub fn remove_logical_child(&mut self, parent: ControlId, child: ControlId) -> Result<()> {
        let logical_parent = self.node(parent)?.child_logical_parent.unwrap_or(parent);
        let owner = self.collection_owner(parent);
        if self.node(child)?.logical_parent == Some(logical_parent) {
            self.set_logical_parent(child, None)?;
        }
        if let LogicalChildren::Default { children, .. } = &mut self.node_mut(owner)?.logical {
            children.retain(|&c| c != child);
        }
        Ok(())
    }

    /// Clear `id`'s logical parent and take it out of that parent's collection.
    pub(crate) fn detach_logical(&mut self, id: ControlId) -> Result<()> {
        let Some(parent) = self.node(id)?.logical_parent else {
            return Ok(());
        };
        self.set_logical_parent(id, None)?;
        if let Some(LogicalChildren::Default { children, .. }) =
            self.nodes.get_mut(parent).map(|n| &mut n.logical)
        {
            children.retain(|&c| c != id);
        }
        Ok(())
    }

    /// Redirect `container`'s logical children.
    ///
    /// Afterwards the children added to `container` get `new_parent` as their
    /// logical parent and live in `owner`'s collection; every current visual
    /// child is moved over. Allowed once, and only before `container`'s own
    /// collection has been read.
    pub fn reparent_logical_children(
        &mut self,
        container: ControlId,
        new_parent: ControlId,
        owner: ControlId,
    ) -> Result<()> {
        self.node(new_parent)?;
        self.node(owner)?;
        let node = self.node(container)?;
        let too_late = match &node.logical {
            LogicalChildren::External(_) => true,
            LogicalChildren::Default { enumerated, .. } => enumerated.get(),
        };
        if too_late {
            return Err(TreeError::ReparentingTooLate(container));
        }

        let mut moving = node.visual_children.clone();
        for &c in node.own_logical_children() {
            if !moving.contains(&c) {
                moving.push(c);
            }
        }

        let node = self.node_mut(container)?;
        node.logical = LogicalChildren::External(owner);
        node.child_logical_parent = Some(new_parent);
        tracing::trace!(
            target: targets::TREE,
            ?container,
            ?new_parent,
            children = moving.len(),
            "logical children reparented"
        );

        for child in moving {
            self.set_logical_parent(child, None)?;
            self.add_logical_child(container, child)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Names
    // -----------------------------------------------------------------------

    /// Rename a control. Only allowed before it is attached to a visual tree.
    pub fn set_name(&mut self, id: ControlId, name: Option<&str>) -> Result<()> {
        let node = self.node(id)?;
        if node.attached {
            return Err(TreeError::ControlAlreadyAttached { control: id });
        }
        if node.name.as_deref() == name {
            return Ok(());
        }

        let scope = match (&node.name_scope, node.logical_parent) {
            (Some(own), _) => Some(own.clone()),
            (None, Some(_)) => self.find_name_scope(id),
            (None, None) => None,
        };
        if let Some(scope) = scope {
            if let Some(new) = name {
                if scope.find(new).is_some_and(|existing| existing != id) {
                    return Err(TreeError::DuplicateName(new.to_string()));
                }
            }
            if let Some(old) = &node.name {
                scope.unregister(old)?;
            }
            if let Some(new) = name {
                scope.register(new, id)?;
            }
        }
        self.node_mut(id)?.name = name.map(str::to_string);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Remove `id` and destroy its visual subtree.
    ///
    /// A descendant whose logical parent lies outside the destroyed subtree is
    /// only detached from its visual parent and stays in the tree, still
    /// logically parented.
    pub fn remove(&mut self, id: ControlId) -> Result<()> {
        self.node(id)?;

        let subtree = self.visual_subtree(id);
        let doomed: HashSet<ControlId> = subtree.iter().copied().collect();
        for &cid in &subtree[1..] {
            let Some(node) = self.nodes.get(cid) else {
                continue;
            };
            let outside = node.logical_parent.is_some_and(|p| !doomed.contains(&p));
            // Skip survivors already carried out with an earlier survivor.
            if outside && self.is_visual_ancestor(id, cid) {
                if let Some(vp) = node.visual_parent {
                    tracing::trace!(target: targets::TREE, survivor = ?cid, "kept on removal");
                    self.remove_visual_child(vp, cid)?;
                }
            }
        }

        let visual_parent = self.node(id)?.visual_parent;
        match visual_parent {
            Some(vp) => {
                self.remove_visual_child(vp, id)?;
            }
            None => self.detach_subtree(id),
        }
        self.detach_logical(id)?;

        let destroyed = self.visual_subtree(id);
        let destroyed_set: HashSet<ControlId> = destroyed.iter().copied().collect();
        for node in self.nodes.values_mut() {
            if node.logical_parent.is_some_and(|p| destroyed_set.contains(&p)) {
                node.logical_parent = None;
            }
        }
        for cid in destroyed {
            if let Some(mut node) = self.nodes.remove(cid) {
                node.dispose();
            }
            self.lifecycle.forget(cid);
        }
        tracing::trace!(target: targets::TREE, ?id, "removed");
        Ok(())
    }

    /// Whether `ancestor` is a strict visual ancestor of `id`.
    pub fn is_visual_ancestor(&self, ancestor: ControlId, id: ControlId) -> bool {
        let mut current = self.visual_parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.visual_parent(p);
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Per-control state owned by control kinds
// ---------------------------------------------------------------------------

impl ControlTree {
    /// Store `value` on `id`, replacing any value of the same type.
    pub(crate) fn insert_extension<T: 'static>(&mut self, id: ControlId, value: T) -> Result<()> {
        self.node_mut(id)?
            .extensions
            .insert(std::any::TypeId::of::<T>(), Box::new(value));
        Ok(())
    }

    pub(crate) fn extension<T: 'static>(&self, id: ControlId) -> Option<&T> {
        self.nodes
            .get(id)?
            .extensions
            .get(&std::any::TypeId::of::<T>())?
            .downcast_ref::<T>()
    }

    /// Remove and return the `T` stored on `id`.
    pub(crate) fn take_extension<T: 'static>(&mut self, id: ControlId) -> Option<T> {
        let boxed = self
            .nodes
            .get_mut(id)?
            .extensions
            .remove(&std::any::TypeId::of::<T>())?;
        boxed.downcast::<T>().ok().map(|b| *b)
    }

    /// Keep `subscription` alive for as long as `id` exists.
    pub(crate) fn add_behavior(&mut self, id: ControlId, subscription: Subscription) -> Result<()> {
        self.node_mut(id)?.behaviors.push(subscription);
        Ok(())
    }

    /// Dispose `signal` together with `id`.
    pub(crate) fn own_signal(&mut self, id: ControlId, signal: SignalId) -> Result<()> {
        self.node_mut(id)?.owned_signals.push(signal);
        Ok(())
    }
}

impl Default for ControlTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ControlTree {
    fn drop(&mut self) {
        // Effects first, so no behavior runs against a half-freed node.
        for node in self.nodes.values_mut() {
            node.style_subscriptions.clear();
            node.behaviors.clear();
        }
        for node in self.nodes.values_mut() {
            node.dispose();
        }
    }
}
