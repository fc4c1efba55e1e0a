//! Template application for lookless controls.

use crate::error::Result;
use crate::logging::targets;
use crate::tree::{ControlId, ControlTree};

use super::{ControlTemplate, TemplateState, TEMPLATED_PARENT};

impl ControlTree {
    pub fn template(&self, id: ControlId) -> Option<ControlTemplate> {
        self.nodes.get(id)?.template.clone()
    }

    pub fn template_state(&self, id: ControlId) -> TemplateState {
        self.nodes
            .get(id)
            .map(|n| n.template_state)
            .unwrap_or_default()
    }

    /// Replace the template of `id`.
    ///
    /// The current template subtree stays in place until the next
    /// [`apply_template`](Self::apply_template), which the next measure pass
    /// triggers.
    pub fn set_template(&mut self, id: ControlId, template: Option<ControlTemplate>) -> Result<()> {
        let node = self.node_mut(id)?;
        node.template = template;
        node.template_state = TemplateState::NoTemplate;
        tracing::trace!(target: targets::TEMPLATE, ?id, "template reset");
        self.invalidate_measure(id);
        Ok(())
    }

    /// Build and install the template of `id`.
    ///
    /// Returns `false` without doing anything when `id` has no template or
    /// its template is already applied.
    #[tracing::instrument(skip(self), target = "lookless::template", level = "debug")]
    pub fn apply_template(&mut self, id: ControlId) -> Result<bool> {
        let node = self.node(id)?;
        if node.template_state == TemplateState::TemplateApplied {
            return Ok(false);
        }
        let Some(template) = node.template.clone() else {
            // A cleared template still leaves its old subtree behind.
            let stale: Vec<ControlId> = node
                .visual_children
                .iter()
                .copied()
                .filter(|&child| self.templated_parent(child) == Some(id))
                .collect();
            for child in stale {
                self.remove(child)?;
            }
            return Ok(false);
        };

        for child in node.visual_children.clone() {
            self.remove(child)?;
        }

        let root = template.build(self, id)?;
        self.node_mut(id)?.template_state = TemplateState::TemplateBuilt;

        let visited = self.tag_template_subtree(id, root)?;
        let scope = self.install_name_scope(root)?;
        self.set_logical_parent(root, Some(id))?;
        self.add_visual_child(id, root)?;

        if self.config().eager_nested_templates {
            for nested in visited {
                self.apply_template(nested)?;
            }
        }

        self.node_mut(id)?.template_state = TemplateState::TemplateApplied;
        if let Some(hook) = self.node(id)?.template_hook.clone() {
            hook(self, id, &scope)?;
        }
        self.lifecycle_mut().on_template_applied(id);
        self.invalidate_measure(id);
        tracing::debug!(
            target: targets::TEMPLATE,
            ?id,
            ?root,
            names = scope.len(),
            "template applied"
        );
        Ok(true)
    }

    /// Tag `root` and its visual descendants with `templated_parent`.
    ///
    /// Presenters are tagged but not descended into; their logical children
    /// are handed to `templated_parent` instead.
    fn tag_template_subtree(
        &mut self,
        templated_parent: ControlId,
        root: ControlId,
    ) -> Result<Vec<ControlId>> {
        let mut visited = Vec::new();
        let mut stack = vec![root];
        while let Some(cid) = stack.pop() {
            self.set_value(cid, &TEMPLATED_PARENT, Some(templated_parent))?;
            visited.push(cid);
            if self.is_presenter(cid) {
                self.reparent_logical_children(cid, templated_parent, templated_parent)?;
                continue;
            }
            stack.extend(self.node(cid)?.visual_children.iter().rev().copied());
        }
        Ok(visited)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::config::TreeConfig;
    use crate::tree::{types, Control, LifecycleEvent};

    /// `Border > ContentPresenter#PART_Presenter`, both logically linked.
    fn border_with_presenter() -> ControlTemplate {
        ControlTemplate::new(|tree, _| {
            let border = tree.insert(Control::new(&types::BORDER).with_name("PART_Border"));
            let presenter = tree.insert(
                Control::new(&types::CONTENT_PRESENTER)
                    .with_name("PART_Presenter")
                    .presenter(),
            );
            tree.add_logical_child(border, presenter)?;
            tree.add_visual_child(border, presenter)?;
            Ok(border)
        })
    }

    fn templated(tree: &mut ControlTree, hits: Rc<Cell<usize>>) -> ControlId {
        tree.insert(
            Control::new(&types::CONTENT_CONTROL)
                .with_template(border_with_presenter())
                .on_template_applied(move |_, _, _| {
                    hits.set(hits.get() + 1);
                    Ok(())
                }),
        )
    }

    #[test]
    fn apply_builds_tags_and_is_idempotent() {
        let mut tree = ControlTree::new();
        let hits = Rc::new(Cell::new(0));
        let cc = templated(&mut tree, hits.clone());
        assert_eq!(tree.template_state(cc), TemplateState::NoTemplate);

        assert!(tree.apply_template(cc).unwrap());
        assert_eq!(tree.template_state(cc), TemplateState::TemplateApplied);
        let root = tree.visual_children(cc)[0];
        let presenter = tree.visual_children(root)[0];
        assert_eq!(tree.templated_parent(root), Some(cc));
        assert_eq!(tree.templated_parent(presenter), Some(cc));
        assert_eq!(tree.templated_parent(cc), None);
        assert_eq!(tree.logical_parent(root), Some(cc));
        assert!(tree.logical_children(cc).is_empty());

        assert!(!tree.apply_template(cc).unwrap());
        assert_eq!(hits.get(), 1);
        assert_eq!(tree.visual_children(cc).len(), 1);
    }

    #[test]
    fn no_template_means_no_hook() {
        let mut tree = ControlTree::new();
        let hits = Rc::new(Cell::new(0));
        let hits_c = hits.clone();
        let cc = tree.insert(Control::new(&types::CONTENT_CONTROL).on_template_applied(
            move |_, _, _| {
                hits_c.set(hits_c.get() + 1);
                Ok(())
            },
        ));
        assert!(!tree.apply_template(cc).unwrap());
        assert_eq!(hits.get(), 0);
        assert_eq!(tree.template_state(cc), TemplateState::NoTemplate);
    }

    #[test]
    fn presenter_children_belong_to_templated_parent() {
        let mut tree = ControlTree::new();
        let cc = templated(&mut tree, Rc::new(Cell::new(0)));
        tree.apply_template(cc).unwrap();
        let presenter = tree.visual_children(tree.visual_children(cc)[0])[0];

        let content = tree.insert(Control::new(&types::TEXT_BLOCK).with_name("Text"));
        tree.add_logical_child(presenter, content).unwrap();
        tree.add_visual_child(presenter, content).unwrap();

        assert_eq!(tree.logical_parent(content), Some(cc));
        assert_eq!(tree.logical_children(cc), vec![content]);
        assert_eq!(tree.logical_children(presenter), vec![content]);
        assert_eq!(tree.templated_parent(content), None);
    }

    #[test]
    fn template_names_live_in_their_own_scope() {
        let mut tree = ControlTree::new();
        let window = tree.insert(Control::new(&types::WINDOW).root());
        let cc = templated(&mut tree, Rc::new(Cell::new(0)));
        tree.add_logical_child(window, cc).unwrap();
        tree.add_visual_child(window, cc).unwrap();
        tree.apply_template(cc).unwrap();

        let root = tree.visual_children(cc)[0];
        let scope = tree.name_scope(root).unwrap();
        assert_eq!(scope.names(), vec!["PART_Border", "PART_Presenter"]);
        assert_eq!(tree.find_control(window, "PART_Border"), None);
    }

    #[test]
    fn changing_template_resets_and_rebuilds_on_next_apply() {
        let mut tree = ControlTree::new();
        let hits = Rc::new(Cell::new(0));
        let cc = templated(&mut tree, hits.clone());
        tree.apply_template(cc).unwrap();
        let old_root = tree.visual_children(cc)[0];

        tree.set_template(cc, Some(border_with_presenter())).unwrap();
        assert_eq!(tree.template_state(cc), TemplateState::NoTemplate);
        assert!(!tree.is_measure_valid(cc));
        assert_eq!(tree.visual_children(cc), &[old_root]);

        assert!(tree.apply_template(cc).unwrap());
        assert!(!tree.contains(old_root));
        assert_eq!(tree.visual_children(cc).len(), 1);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn clearing_the_template_removes_the_old_subtree() {
        let mut tree = ControlTree::new();
        let hits = Rc::new(Cell::new(0));
        let cc = templated(&mut tree, hits.clone());
        tree.apply_template(cc).unwrap();
        let old_root = tree.visual_children(cc)[0];
        let presenter = tree.visual_children(old_root)[0];

        tree.set_template(cc, None).unwrap();
        tree.measure(cc).unwrap();
        assert!(tree.visual_children(cc).is_empty());
        assert!(!tree.contains(old_root));
        assert!(!tree.contains(presenter));
        assert_eq!(tree.template_state(cc), TemplateState::NoTemplate);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn untemplated_controls_keep_their_children() {
        let mut tree = ControlTree::new();
        let border = tree.insert(Control::new(&types::BORDER));
        let child = tree.insert(Control::new(&types::TEXT_BLOCK));
        tree.add_visual_child(border, child).unwrap();

        assert!(!tree.apply_template(border).unwrap());
        assert_eq!(tree.visual_children(border), &[child]);
    }

    #[test]
    fn nested_templates_apply_eagerly_unless_disabled() {
        for eager in [true, false] {
            let mut tree =
                ControlTree::with_config(TreeConfig::new().with_eager_nested_templates(eager));
            let inner_template = border_with_presenter();
            let outer = tree.insert(Control::new(&types::CONTENT_CONTROL).with_template(
                ControlTemplate::new(move |tree, _| {
                    Ok(tree.insert(
                        Control::new(&types::CONTENT_CONTROL)
                            .with_name("PART_Inner")
                            .with_template(inner_template.clone()),
                    ))
                }),
            ));
            tree.apply_template(outer).unwrap();
            let inner = tree.visual_children(outer)[0];
            let expected = if eager {
                TemplateState::TemplateApplied
            } else {
                TemplateState::NoTemplate
            };
            assert_eq!(tree.template_state(inner), expected);
        }
    }

    #[test]
    fn template_applied_event_is_recorded() {
        let mut tree = ControlTree::new();
        let cc = templated(&mut tree, Rc::new(Cell::new(0)));
        tree.take_lifecycle_events();
        tree.apply_template(cc).unwrap();
        assert_eq!(
            tree.take_lifecycle_events(),
            vec![LifecycleEvent::TemplateApplied { control: cc }]
        );
    }
}
