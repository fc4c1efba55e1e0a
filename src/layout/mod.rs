//! Measure invalidation and the measure pass.
//!
//! Geometry is not computed here. The pass exists to drive lazy template
//! application: a control whose template was reset is rebuilt the next time
//! its branch is measured.

use crate::error::Result;
use crate::logging::targets;
use crate::tree::{ControlId, ControlTree};

impl ControlTree {
    /// Mark `id` and its visual ancestors as needing a measure pass.
    pub fn invalidate_measure(&mut self, id: ControlId) {
        let mut current = Some(id);
        while let Some(cid) = current {
            let Some(node) = self.nodes.get_mut(cid) else {
                break;
            };
            node.measure_valid = false;
            current = node.visual_parent;
        }
    }

    pub fn is_measure_valid(&self, id: ControlId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.measure_valid)
    }

    /// Measure the visual subtree rooted at `root`.
    ///
    /// Pending templates are applied on the way down; controls are marked
    /// valid on the way up, so invalidations raised by template application
    /// inside the branch are absorbed. Valid branches are skipped. Returns the
    /// number of controls measured.
    pub fn measure(&mut self, root: ControlId) -> Result<usize> {
        self.node(root)?;
        let mut measured = 0;
        let mut stack = vec![(root, false)];
        while let Some((id, children_done)) = stack.pop() {
            if children_done {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.measure_valid = true;
                    measured += 1;
                }
                continue;
            }
            if self.is_measure_valid(id) || !self.contains(id) {
                continue;
            }
            self.apply_template(id)?;
            stack.push((id, true));
            stack.extend(self.visual_children(id).iter().rev().map(|&c| (c, false)));
        }
        tracing::trace!(target: targets::TREE, ?root, measured, "measure pass");
        Ok(measured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{ControlTemplate, TemplateState};
    use crate::tree::{types, Control};

    fn chain(tree: &mut ControlTree) -> (ControlId, ControlId, ControlId) {
        let root = tree.insert(Control::new(&types::WINDOW).root());
        let panel = tree.insert(Control::new(&types::STACK_PANEL));
        let leaf = tree.insert(Control::new(&types::TEXT_BLOCK));
        tree.add_visual_child(root, panel).unwrap();
        tree.add_visual_child(panel, leaf).unwrap();
        (root, panel, leaf)
    }

    #[test]
    fn measure_validates_and_skips_valid_branches() {
        let mut tree = ControlTree::new();
        let (root, panel, leaf) = chain(&mut tree);
        assert!(!tree.is_measure_valid(root));

        assert_eq!(tree.measure(root).unwrap(), 3);
        assert!([root, panel, leaf].iter().all(|&id| tree.is_measure_valid(id)));
        assert_eq!(tree.measure(root).unwrap(), 0);
    }

    #[test]
    fn invalidation_bubbles_to_ancestors_only() {
        let mut tree = ControlTree::new();
        let (root, panel, leaf) = chain(&mut tree);
        let sibling = tree.insert(Control::new(&types::TEXT_BLOCK));
        tree.add_visual_child(root, sibling).unwrap();
        tree.measure(root).unwrap();

        tree.invalidate_measure(panel);
        assert!(!tree.is_measure_valid(panel));
        assert!(!tree.is_measure_valid(root));
        assert!(tree.is_measure_valid(leaf));
        assert!(tree.is_measure_valid(sibling));
        assert_eq!(tree.measure(root).unwrap(), 2);
    }

    #[test]
    fn measure_applies_pending_templates() {
        let mut tree = ControlTree::new();
        let (root, panel, _) = chain(&mut tree);
        let cc = tree.insert(Control::new(&types::CONTENT_CONTROL).with_template(
            ControlTemplate::new(|tree, _| {
                let outer = tree.insert(Control::new(&types::BORDER));
                let inner = tree.insert(Control::new(&types::BORDER));
                tree.add_visual_child(outer, inner)?;
                Ok(outer)
            }),
        ));
        tree.add_visual_child(panel, cc).unwrap();

        tree.measure(root).unwrap();
        assert_eq!(tree.template_state(cc), TemplateState::TemplateApplied);
        let outer = tree.visual_children(cc)[0];
        let inner = tree.visual_children(outer)[0];
        assert!(tree.visual_subtree(root).iter().all(|&id| tree.is_measure_valid(id)));
        assert!(tree.is_measure_valid(inner));
    }
}
