//! Lookless templates.
//!
//! A [`ControlTemplate`] builds a control's visual subtree on demand. Every
//! control it produces is tagged with the templated parent through the
//! attached [`TEMPLATED_PARENT`] property; presenters (tagged with
//! [`IS_PRESENTER`]) hand their logical children to the templated parent.

mod lookless;

use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::property::Property;
use crate::tree::{types, ControlId, ControlTree};

/// The control a template-built control belongs to.
pub static TEMPLATED_PARENT: Property<Option<ControlId>> =
    Property::attached(&types::CONTROL, "TemplatedParent", || None);

/// Marks a container whose children belong logically to the templated parent.
pub static IS_PRESENTER: Property<bool> =
    Property::attached(&types::CONTROL, "IsPresenter", || false);

type BuildFn = dyn Fn(&mut ControlTree, ControlId) -> Result<ControlId>;

/// Builds a fresh visual subtree for a templated control and returns its root.
///
/// The function receives the templated control's id. Each call must produce
/// new controls.
#[derive(Clone)]
pub struct ControlTemplate(Rc<BuildFn>);

impl ControlTemplate {
    pub fn new(build: impl Fn(&mut ControlTree, ControlId) -> Result<ControlId> + 'static) -> Self {
        Self(Rc::new(build))
    }

    pub(crate) fn build(
        &self,
        tree: &mut ControlTree,
        templated_parent: ControlId,
    ) -> Result<ControlId> {
        (self.0)(tree, templated_parent)
    }
}

impl fmt::Debug for ControlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ControlTemplate")
    }
}

/// Where a templated control is in its template lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateState {
    #[default]
    NoTemplate,
    TemplateBuilt,
    TemplateApplied,
}

impl ControlTree {
    /// The templated parent of `id`, if a template built it.
    pub fn templated_parent(&self, id: ControlId) -> Option<ControlId> {
        self.existing_slot(id, TEMPLATED_PARENT.key())
            .and_then(|slot| slot.effective_untracked::<Option<ControlId>>())
            .flatten()
    }

    pub fn is_presenter(&self, id: ControlId) -> bool {
        self.existing_slot(id, IS_PRESENTER.key())
            .and_then(|slot| slot.effective_untracked::<bool>())
            .unwrap_or(false)
    }
}
