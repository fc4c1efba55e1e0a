//! Panels: controls with an ordered list of children.
//!
//! A child added to a panel becomes both its visual and its logical child. If
//! the panel is a template presenter, the logical side lands on the templated
//! parent instead.

use crate::error::{ParentKind, Result, TreeError};
use crate::tree::{types, Control, ControlId, ControlTree};

use super::collection::{CollectionAction, CollectionChange};

/// Handle to a panel control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Panel(ControlId);

impl Panel {
    /// Insert a plain `Panel`.
    pub fn new(tree: &mut ControlTree) -> Self {
        Self::create(tree, Control::new(&types::PANEL))
    }

    /// Insert `control` and treat it as a panel.
    pub fn create(tree: &mut ControlTree, control: Control) -> Self {
        Self(tree.insert(control))
    }

    /// Wrap an existing control.
    pub fn from_id(id: ControlId) -> Self {
        Self(id)
    }

    pub fn id(self) -> ControlId {
        self.0
    }

    pub fn children(self, tree: &ControlTree) -> Vec<ControlId> {
        tree.visual_children(self.0).to_vec()
    }

    pub fn add_child(self, tree: &mut ControlTree, child: ControlId) -> Result<()> {
        let index = tree.visual_children(self.0).len();
        self.insert_child(tree, index, child)
    }

    /// Insert `child` at `index`, logical parent first.
    ///
    /// Fails without touching the logical tree when `child` already has a
    /// different visual parent.
    pub fn insert_child(
        self,
        tree: &mut ControlTree,
        index: usize,
        child: ControlId,
    ) -> Result<()> {
        match tree.visual_parent(child) {
            Some(p) if p == self.0 => return Ok(()),
            Some(_) => {
                return Err(TreeError::AlreadyParented {
                    control: child,
                    kind: ParentKind::Visual,
                })
            }
            None => {}
        }
        tree.add_logical_child(self.0, child)?;
        tree.insert_visual_child(self.0, index, child)
    }

    /// Remove `child`, logical parent first. Returns `false` if `child` is not
    /// a child of this panel.
    pub fn remove_child(self, tree: &mut ControlTree, child: ControlId) -> Result<bool> {
        if tree.visual_parent(child) != Some(self.0) {
            return Ok(false);
        }
        tree.remove_logical_child(self.0, child)?;
        tree.remove_visual_child(self.0, child)
    }

    /// Apply a change notification from a children collection.
    ///
    /// `Replace` is handled as a removal followed by an insertion at the same
    /// index. `Move` and `Reset` are rejected.
    pub fn apply_change(
        self,
        tree: &mut ControlTree,
        change: CollectionChange<ControlId>,
    ) -> Result<()> {
        match change {
            CollectionChange::Add { index, items } => self.insert_all(tree, index, &items),
            CollectionChange::Remove { items, .. } => self.remove_all(tree, &items),
            CollectionChange::Replace {
                index,
                old_items,
                new_items,
            } => {
                self.remove_all(tree, &old_items)?;
                self.insert_all(tree, index, &new_items)
            }
            CollectionChange::Move { .. } => {
                Err(TreeError::UnsupportedCollectionAction(CollectionAction::Move))
            }
            CollectionChange::Reset => {
                Err(TreeError::UnsupportedCollectionAction(CollectionAction::Reset))
            }
        }
    }

    fn insert_all(self, tree: &mut ControlTree, index: usize, items: &[ControlId]) -> Result<()> {
        for (offset, &child) in items.iter().enumerate() {
            self.insert_child(tree, index + offset, child)?;
        }
        Ok(())
    }

    fn remove_all(self, tree: &mut ControlTree, items: &[ControlId]) -> Result<()> {
        for &child in items {
            self.remove_child(tree, child)?;
        }
        Ok(())
    }
}
