//! `ContentControl`: a lookless control presenting a single piece of content.
//!
//! The template decides where the content goes by naming a presenter
//! `PART_ContentPresenter`. The content stays the logical child of the
//! control itself, so it survives template swaps and its name lives in the
//! control's name scope rather than the template's.

use crate::error::{ParentKind, Result, TreeError};
use crate::logging::targets;
use crate::property::Property;
use crate::template::{ControlTemplate, TemplateState};
use crate::tree::{types, Control, ControlId, ControlTree, NameScope};

use super::decorator::{Border, ContentHost, Decorator};

/// The content of a `ContentControl`.
pub static CONTENT: Property<Option<ControlId>> =
    Property::new(&types::CONTENT_CONTROL, "Content", || None);

/// Name of the presenter a `ContentControl` template must provide.
pub const PART_CONTENT_PRESENTER: &str = "PART_ContentPresenter";

/// Handle to a `ContentControl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentControl(ControlId);

impl ContentControl {
    pub fn new(tree: &mut ControlTree) -> Self {
        Self::create(tree, Control::new(&types::CONTENT_CONTROL))
    }

    /// Insert `control` as a content control.
    ///
    /// Without a template it gets [`default_template`](Self::default_template).
    /// Any template-applied hook on `control` runs after the content is placed.
    pub fn create(tree: &mut ControlTree, mut control: Control) -> Self {
        if control.template.is_none() {
            control.template = Some(Self::default_template());
        }
        let user_hook = control.template_hook.take();
        let control = control.on_template_applied(
            move |tree: &mut ControlTree, id: ControlId, scope: &NameScope| {
                Self::place_content(tree, id, scope)?;
                match &user_hook {
                    Some(hook) => hook(tree, id, scope),
                    None => Ok(()),
                }
            },
        );
        Self(tree.insert(control))
    }

    pub fn from_id(id: ControlId) -> Self {
        Self(id)
    }

    pub fn id(self) -> ControlId {
        self.0
    }

    /// `Border > ContentPresenter#PART_ContentPresenter`.
    pub fn default_template() -> ControlTemplate {
        ControlTemplate::new(|tree, _| {
            let border = Border::new(tree);
            let host = ContentHost::create(tree, PART_CONTENT_PRESENTER);
            border.set_child(tree, Some(host.id()))?;
            Ok(border.id())
        })
    }

    pub fn content(self, tree: &ControlTree) -> Option<ControlId> {
        tree.get_value(self.0, &CONTENT)
    }

    /// The presenter of the applied template, if any.
    pub fn presenter(self, tree: &ControlTree) -> Option<Decorator> {
        if tree.template_state(self.0) != TemplateState::TemplateApplied {
            return None;
        }
        let root = *tree.visual_children(self.0).first()?;
        tree.name_scope(root)?
            .find(PART_CONTENT_PRESENTER)
            .map(Decorator::from_id)
    }

    /// Replace the content.
    ///
    /// The new content becomes a logical child of this control straight away;
    /// it joins the visual tree once a template presenter exists.
    pub fn set_content(self, tree: &mut ControlTree, content: Option<ControlId>) -> Result<()> {
        let old = self.content(tree);
        if old == content {
            return Ok(());
        }
        if let Some(new) = content {
            if tree.visual_parent(new).is_some() {
                return Err(TreeError::AlreadyParented {
                    control: new,
                    kind: ParentKind::Visual,
                });
            }
        }

        let presenter = self.presenter(tree);
        if let Some(old) = old {
            match presenter {
                Some(p) if p.child(tree) == Some(old) => p.set_child(tree, None)?,
                _ => tree.remove_logical_child(self.0, old)?,
            }
        }
        if let Some(new) = content {
            tree.add_logical_child(self.0, new)?;
        }
        tree.set_value(self.0, &CONTENT, content)?;
        if let Some(p) = presenter {
            p.set_child(tree, content)?;
        }
        tracing::trace!(
            target: targets::TEMPLATE,
            control = ?self.0,
            ?old,
            new = ?content,
            "content replaced"
        );
        Ok(())
    }

    fn place_content(tree: &mut ControlTree, id: ControlId, scope: &NameScope) -> Result<()> {
        let presenter = Decorator::from_id(scope.get(PART_CONTENT_PRESENTER)?);
        let content = tree.get_value(id, &CONTENT);
        if let Some(c) = content {
            tree.add_logical_child(id, c)?;
        }
        presenter.set_child(tree, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::text_block::TextBlock;
    use pretty_assertions::assert_eq;

    fn window_with(tree: &mut ControlTree, cc: ContentControl) -> ControlId {
        let window = tree.insert(Control::new(&types::WINDOW).root());
        tree.add_logical_child(window, cc.id()).unwrap();
        tree.add_visual_child(window, cc.id()).unwrap();
        window
    }

    #[test]
    fn content_is_presented_but_logically_owned() {
        let mut tree = ControlTree::new();
        let cc = ContentControl::new(&mut tree);
        let window = window_with(&mut tree, cc);
        let text = tree.insert(Control::new(&types::TEXT_BLOCK).with_name("Foo"));
        cc.set_content(&mut tree, Some(text)).unwrap();
        assert_eq!(tree.logical_parent(text), Some(cc.id()));
        assert_eq!(tree.visual_parent(text), None);

        tree.measure(window).unwrap();
        let presenter = cc.presenter(&tree).unwrap();
        assert_eq!(tree.visual_parent(text), Some(presenter.id()));
        assert_eq!(tree.logical_parent(text), Some(cc.id()));
        assert_eq!(tree.find_control(window, "Foo"), Some(text));
        assert_eq!(tree.find_control(window, PART_CONTENT_PRESENTER), None);
    }

    #[test]
    fn content_survives_template_swap() {
        let mut tree = ControlTree::new();
        let cc = ContentControl::new(&mut tree);
        let window = window_with(&mut tree, cc);
        let text = TextBlock::create(&mut tree, "hello").unwrap();
        cc.set_content(&mut tree, Some(text)).unwrap();
        tree.measure(window).unwrap();
        let first = cc.presenter(&tree).unwrap();

        tree.set_template(cc.id(), Some(ContentControl::default_template()))
            .unwrap();
        tree.measure(window).unwrap();
        let second = cc.presenter(&tree).unwrap();

        assert!(!tree.contains(first.id()));
        assert!(tree.contains(text));
        assert_eq!(tree.visual_parent(text), Some(second.id()));
        assert_eq!(tree.logical_parent(text), Some(cc.id()));
    }

    #[test]
    fn replacing_content_detaches_the_old_one() {
        let mut tree = ControlTree::new();
        let cc = ContentControl::new(&mut tree);
        let window = window_with(&mut tree, cc);
        tree.measure(window).unwrap();

        let a = tree.insert(Control::new(&types::TEXT_BLOCK).with_name("a"));
        let b = tree.insert(Control::new(&types::TEXT_BLOCK).with_name("b"));
        cc.set_content(&mut tree, Some(a)).unwrap();
        cc.set_content(&mut tree, Some(b)).unwrap();

        assert_eq!(tree.logical_parent(a), None);
        assert_eq!(tree.visual_parent(a), None);
        assert_eq!(tree.find_control(window, "a"), None);
        assert_eq!(cc.presenter(&tree).unwrap().child(&tree), Some(b));

        cc.set_content(&mut tree, None).unwrap();
        assert_eq!(cc.content(&tree), None);
        assert_eq!(tree.logical_parent(b), None);
    }

    #[test]
    fn template_without_presenter_fails_in_hook() {
        let mut tree = ControlTree::new();
        let bare = ControlTemplate::new(|tree, _| Ok(Border::new(tree).id()));
        let cc = ContentControl::create(
            &mut tree,
            Control::new(&types::CONTENT_CONTROL).with_template(bare),
        );
        let err = tree.apply_template(cc.id()).unwrap_err();
        assert_eq!(err, TreeError::KeyNotFound(PART_CONTENT_PRESENTER.to_string()));
    }
}
