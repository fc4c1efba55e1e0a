//! Indented text rendering of control trees.

use std::fmt::Write;

use crate::tree::{ControlId, ControlTree};

/// Which parent links to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    Visual,
    Logical,
}

/// Render the tree under `root`, one control per line.
///
/// Each line is `Type#name.class`, indented two spaces per level. The logical
/// dump lists a child under the control it is logically parented to, and reads
/// the collections without materializing them.
///
/// ```ignore
/// Window
///   StackPanel#Items
///     Border.selected
/// ```
pub fn tree_to_string(tree: &ControlTree, root: ControlId, kind: TreeKind) -> String {
    let mut out = String::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        if !tree.contains(id) {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = write!(out, "{:indent$}{}", "", label(tree, id), indent = depth * 2);

        let children: Vec<ControlId> = match kind {
            TreeKind::Visual => tree.visual_children(id).to_vec(),
            TreeKind::Logical => tree
                .logical_children_raw(id)
                .into_iter()
                .filter(|&c| tree.logical_parent(c) == Some(id))
                .collect(),
        };
        stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
    }
    out
}

fn label(tree: &ControlTree, id: ControlId) -> String {
    let mut label = tree
        .control_type(id)
        .map(|ty| ty.name().to_string())
        .unwrap_or_default();
    if let Some(name) = tree.name(id) {
        let _ = write!(label, "#{name}");
    }
    if let Some(classes) = tree.classes(id) {
        for class in classes.to_vec() {
            let _ = write!(label, ".{class}");
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{types, Control};

    #[test]
    fn visual_and_logical_dumps_differ_under_reparenting() {
        let mut tree = ControlTree::new();
        let window = tree.insert(Control::new(&types::WINDOW).root());
        let host = tree.insert(Control::new(&types::STACK_PANEL).with_name("Host"));
        let child = tree.insert(Control::new(&types::BORDER).with_class("a").with_class("b"));
        tree.add_logical_child(window, host).unwrap();
        tree.add_visual_child(window, host).unwrap();
        tree.reparent_logical_children(host, window, window).unwrap();
        tree.add_logical_child(host, child).unwrap();
        tree.add_visual_child(host, child).unwrap();

        insta::assert_snapshot!(tree_to_string(&tree, window, TreeKind::Visual), @r"
        Window
          StackPanel#Host
            Border.a.b
        ");
        insta::assert_snapshot!(tree_to_string(&tree, window, TreeKind::Logical), @r"
        Window
          StackPanel#Host
          Border.a.b
        ");
    }
}
