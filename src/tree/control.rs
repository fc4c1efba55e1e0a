//! Control identity, the insertion builder and per-node storage.

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use slotmap::new_key_type;

use crate::error::Result;
use crate::property::{PropertyKey, PropertySlot};
use crate::reactive::{SignalId, Subscription};
use crate::template::{ControlTemplate, TemplateState};

use super::classes::Classes;
use super::name_scope::NameScope;
use super::types::ControlType;
use super::ControlTree;

new_key_type! {
    /// Unique identifier for a control in a [`ControlTree`]. Copy, lightweight.
    pub struct ControlId;
}

/// Called after a template has been applied, with the template's name scope.
pub type TemplateAppliedHook = Rc<dyn Fn(&mut ControlTree, ControlId, &NameScope) -> Result<()>>;

// ---------------------------------------------------------------------------
// Control (builder)
// ---------------------------------------------------------------------------

/// Description of a control to insert into a [`ControlTree`].
///
/// ```ignore
/// let id = tree.insert(Control::new(&types::BORDER).with_name("Foo").with_class("outlined"));
/// ```
#[derive(Clone)]
pub struct Control {
    pub(crate) control_type: &'static ControlType,
    pub(crate) style_key: Option<&'static ControlType>,
    pub(crate) name: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) root: bool,
    pub(crate) presenter: bool,
    pub(crate) name_scope: bool,
    pub(crate) template: Option<ControlTemplate>,
    pub(crate) template_hook: Option<TemplateAppliedHook>,
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("control_type", &self.control_type)
            .field("name", &self.name)
            .field("classes", &self.classes)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Control {
    pub fn new(control_type: &'static ControlType) -> Self {
        Self {
            control_type,
            style_key: None,
            name: None,
            classes: Vec::new(),
            root: false,
            presenter: false,
            name_scope: false,
            template: None,
            template_hook: None,
        }
    }

    /// Present as another type to style selectors.
    pub fn with_style_key(mut self, key: &'static ControlType) -> Self {
        self.style_key = Some(key);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn with_classes(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for class in classes {
            self = self.with_class(class);
        }
        self
    }

    /// Mark as a visual root: attached as soon as it is inserted, and owner of
    /// a name scope.
    pub fn root(mut self) -> Self {
        self.root = true;
        self.name_scope = true;
        self
    }

    /// Mark as a presenter: template application hands its logical children
    /// to the templated parent.
    pub fn presenter(mut self) -> Self {
        self.presenter = true;
        self
    }

    /// Give the control its own name scope.
    pub fn with_name_scope(mut self) -> Self {
        self.name_scope = true;
        self
    }

    pub fn with_template(mut self, template: ControlTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Run `hook` each time the template is applied.
    pub fn on_template_applied(
        mut self,
        hook: impl Fn(&mut ControlTree, ControlId, &NameScope) -> Result<()> + 'static,
    ) -> Self {
        self.template_hook = Some(Rc::new(hook));
        self
    }
}

// ---------------------------------------------------------------------------
// LogicalChildren
// ---------------------------------------------------------------------------

/// Where a control's logical children live.
#[derive(Debug)]
pub(crate) enum LogicalChildren {
    /// The control's own collection. `enumerated` is set the first time a
    /// caller reads it, after which reparenting is refused.
    Default {
        children: Vec<ControlId>,
        enumerated: Cell<bool>,
    },
    /// The collection of another control, installed by reparenting.
    External(ControlId),
}

impl Default for LogicalChildren {
    fn default() -> Self {
        Self::Default {
            children: Vec::new(),
            enumerated: Cell::new(false),
        }
    }
}

// ---------------------------------------------------------------------------
// ControlNode
// ---------------------------------------------------------------------------

/// Storage for one control inside the arena.
pub(crate) struct ControlNode {
    pub(crate) control_type: &'static ControlType,
    pub(crate) style_key: &'static ControlType,
    pub(crate) name: Option<String>,
    pub(crate) classes: Classes,
    pub(crate) visual_parent: Option<ControlId>,
    pub(crate) visual_children: Vec<ControlId>,
    pub(crate) logical_parent: Option<ControlId>,
    pub(crate) logical: LogicalChildren,
    /// Logical parent handed to children added to this control. `None` means
    /// the control itself.
    pub(crate) child_logical_parent: Option<ControlId>,
    pub(crate) is_root: bool,
    pub(crate) name_scope: Option<NameScope>,
    pub(crate) attached: bool,
    pub(crate) measure_valid: bool,
    pub(crate) properties: RefCell<HashMap<PropertyKey, PropertySlot>>,
    pub(crate) template: Option<ControlTemplate>,
    pub(crate) template_state: TemplateState,
    pub(crate) template_hook: Option<TemplateAppliedHook>,
    pub(crate) style_subscriptions: Vec<Subscription>,
    pub(crate) behaviors: Vec<Subscription>,
    pub(crate) owned_signals: Vec<SignalId>,
    pub(crate) extensions: HashMap<TypeId, Box<dyn Any>>,
}

impl ControlNode {
    pub(crate) fn new(control: Control) -> Self {
        Self {
            control_type: control.control_type,
            style_key: control.style_key.unwrap_or(control.control_type),
            name: control.name,
            classes: Classes::new(control.classes),
            visual_parent: None,
            visual_children: Vec::new(),
            logical_parent: None,
            logical: LogicalChildren::default(),
            child_logical_parent: None,
            is_root: control.root,
            name_scope: control.name_scope.then(NameScope::new),
            attached: false,
            measure_valid: false,
            properties: RefCell::new(HashMap::new()),
            template: control.template,
            template_state: TemplateState::NoTemplate,
            template_hook: control.template_hook,
            style_subscriptions: Vec::new(),
            behaviors: Vec::new(),
            owned_signals: Vec::new(),
            extensions: HashMap::new(),
        }
    }

    /// Existing property slot, without creating one.
    pub(crate) fn slot(&self, key: PropertyKey) -> Option<PropertySlot> {
        self.properties.borrow().get(&key).copied()
    }

    /// Property slot, created on first use.
    pub(crate) fn slot_or_insert(&self, key: PropertyKey) -> PropertySlot {
        *self
            .properties
            .borrow_mut()
            .entry(key)
            .or_insert_with(PropertySlot::new)
    }

    /// Raw logical children of this node's own collection. Does not count as
    /// enumeration.
    pub(crate) fn own_logical_children(&self) -> &[ControlId] {
        match &self.logical {
            LogicalChildren::Default { children, .. } => children,
            LogicalChildren::External(_) => &[],
        }
    }

    /// Free every reactive resource the node owns.
    pub(crate) fn dispose(&mut self) {
        self.style_subscriptions.clear();
        self.behaviors.clear();
        for slot in self.properties.get_mut().values() {
            slot.dispose();
        }
        self.classes.dispose();
        for id in self.owned_signals.drain(..) {
            crate::reactive::dispose_signal(id);
        }
        self.extensions.clear();
    }
}

impl fmt::Debug for ControlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlNode")
            .field("control_type", &self.control_type)
            .field("name", &self.name)
            .field("visual_parent", &self.visual_parent)
            .field("logical_parent", &self.logical_parent)
            .field("attached", &self.attached)
            .finish_non_exhaustive()
    }
}
