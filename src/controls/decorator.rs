//! Single-child controls: decorators, borders and content hosts.

use crate::error::{ParentKind, Result, TreeError};
use crate::logging::targets;
use crate::tree::{types, Control, ControlId, ControlTree};

/// Handle to a control holding at most one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decorator(ControlId);

impl Decorator {
    pub fn create(tree: &mut ControlTree, control: Control) -> Self {
        Self(tree.insert(control))
    }

    pub fn from_id(id: ControlId) -> Self {
        Self(id)
    }

    pub fn id(self) -> ControlId {
        self.0
    }

    pub fn child(self, tree: &ControlTree) -> Option<ControlId> {
        tree.visual_children(self.0).first().copied()
    }

    /// Replace the child.
    ///
    /// The old child loses its logical parent before it leaves the visual
    /// tree, so nothing observes a visual child whose logical parent is stale.
    pub fn set_child(self, tree: &mut ControlTree, child: Option<ControlId>) -> Result<()> {
        let old = self.child(tree);
        if old == child {
            return Ok(());
        }
        if let Some(new) = child {
            if tree.visual_parent(new).is_some() {
                return Err(TreeError::AlreadyParented {
                    control: new,
                    kind: ParentKind::Visual,
                });
            }
        }

        if let Some(old) = old {
            tree.remove_logical_child(self.0, old)?;
            tree.remove_visual_child(self.0, old)?;
        }
        if let Some(new) = child {
            tree.add_logical_child(self.0, new)?;
            tree.add_visual_child(self.0, new)?;
        }
        tracing::trace!(
            target: targets::TREE,
            decorator = ?self.0,
            ?old,
            new = ?child,
            "child replaced"
        );
        Ok(())
    }
}

/// A decorator that draws a frame around its child.
pub struct Border;

impl Border {
    pub fn new(tree: &mut ControlTree) -> Decorator {
        Decorator::create(tree, Control::new(&types::BORDER))
    }

    pub fn with_name(tree: &mut ControlTree, name: &str) -> Decorator {
        Decorator::create(tree, Control::new(&types::BORDER).with_name(name))
    }
}

/// The presenter used inside templates to host the templated control's
/// content. Its child belongs logically to the templated parent.
pub struct ContentHost;

impl ContentHost {
    /// Builder for a content host; add a name before inserting.
    pub fn control() -> Control {
        Control::new(&types::CONTENT_PRESENTER).presenter()
    }

    pub fn create(tree: &mut ControlTree, name: &str) -> Decorator {
        Decorator::create(tree, Self::control().with_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_child_swaps_both_parents() {
        let mut tree = ControlTree::new();
        let border = Border::new(&mut tree);
        let a = tree.insert(Control::new(&types::TEXT_BLOCK));
        let b = tree.insert(Control::new(&types::TEXT_BLOCK));

        border.set_child(&mut tree, Some(a)).unwrap();
        assert_eq!(border.child(&tree), Some(a));
        assert_eq!(tree.logical_parent(a), Some(border.id()));

        border.set_child(&mut tree, Some(b)).unwrap();
        assert_eq!(border.child(&tree), Some(b));
        assert_eq!(tree.logical_parent(a), None);
        assert_eq!(tree.visual_parent(a), None);
        assert_eq!(tree.logical_children(border.id()), vec![b]);

        border.set_child(&mut tree, None).unwrap();
        assert_eq!(border.child(&tree), None);
        assert!(tree.logical_children(border.id()).is_empty());
    }

    #[test]
    fn clearing_child_unregisters_name_and_detaches() {
        let mut tree = ControlTree::new();
        let window = tree.insert(Control::new(&types::WINDOW).root());
        let border = Border::new(&mut tree);
        tree.add_logical_child(window, border.id()).unwrap();
        tree.add_visual_child(window, border.id()).unwrap();
        let a = tree.insert(Control::new(&types::TEXT_BLOCK).with_name("a"));
        border.set_child(&mut tree, Some(a)).unwrap();
        tree.take_lifecycle_events();

        border.set_child(&mut tree, None).unwrap();
        assert_eq!(tree.find_control(window, "a"), None);
        assert_eq!(tree.take_lifecycle_events().len(), 1);
    }

    #[test]
    fn content_host_is_a_presenter() {
        let mut tree = ControlTree::new();
        let host = ContentHost::create(&mut tree, "PART_ContentPresenter");
        assert!(tree.is_presenter(host.id()));
        assert_eq!(tree.name(host.id()), Some("PART_ContentPresenter"));
    }
}
