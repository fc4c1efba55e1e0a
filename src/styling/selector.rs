//! Chainable style selectors and their evaluation against a live tree.
//!
//! A selector is a linked chain of steps, newest last. Matching walks the
//! chain backwards from the candidate control. Combinator steps (`child`,
//! `descendant`, `template`) re-anchor the rest of the chain on another
//! control and stop the walk on the candidate.
//!
//! ```ignore
//! let sel = Selectors::is(&types::WINDOW).descendant().of_type(&types::BORDER);
//! assert_eq!(sel.to_string(), ":is(Window) Border");
//! ```

use std::fmt;
use std::rc::Rc;

use crate::property::{Property, PropertyKey};
use crate::tree::{ControlId, ControlTree, ControlType};

use super::activator::{Activator, SelectorMatch};

type PropertyMatcher = Rc<dyn Fn(&ControlTree, ControlId) -> SelectorMatch>;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum SelectorStep {
    Any,
    OfType(&'static ControlType),
    Is(&'static ControlType),
    Class(String),
    Name(String),
    PropertyEquals {
        key: PropertyKey,
        display: String,
        matcher: PropertyMatcher,
    },
    Child,
    Descendant,
    Template,
}

impl fmt::Debug for SelectorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::OfType(t) => write!(f, "OfType({t})"),
            Self::Is(t) => write!(f, "Is({t})"),
            Self::Class(c) => write!(f, "Class({c})"),
            Self::Name(n) => write!(f, "Name({n})"),
            Self::PropertyEquals { key, .. } => write!(f, "PropertyEquals({key})"),
            Self::Child => f.write_str("Child"),
            Self::Descendant => f.write_str("Descendant"),
            Self::Template => f.write_str("Template"),
        }
    }
}

#[derive(Debug)]
struct SelectorNode {
    previous: Option<StyleSelector>,
    step: SelectorStep,
    /// The step re-anchors the remaining chain; matching on the candidate
    /// stops here.
    stop_traversal: bool,
    /// The step and everything after it sits behind a `template` step, so the
    /// candidate must have a templated parent.
    in_template: bool,
}

// ---------------------------------------------------------------------------
// StyleSelector
// ---------------------------------------------------------------------------

/// An immutable selector chain. Cheap to clone.
#[derive(Clone, Debug)]
pub struct StyleSelector(Rc<SelectorNode>);

/// Entry points for building selectors.
pub struct Selectors;

impl Selectors {
    /// Matches every control.
    pub fn any() -> StyleSelector {
        StyleSelector::first(SelectorStep::Any)
    }

    /// Style key equals `ty` exactly.
    pub fn of_type(ty: &'static ControlType) -> StyleSelector {
        StyleSelector::first(SelectorStep::OfType(ty))
    }

    /// Style key is `ty` or derives from it.
    pub fn is(ty: &'static ControlType) -> StyleSelector {
        StyleSelector::first(SelectorStep::Is(ty))
    }

    pub fn class(class: impl Into<String>) -> StyleSelector {
        StyleSelector::first(SelectorStep::Class(class.into()))
    }

    pub fn name(name: impl Into<String>) -> StyleSelector {
        StyleSelector::first(SelectorStep::Name(name.into()))
    }
}

impl StyleSelector {
    fn first(step: SelectorStep) -> Self {
        Self(Rc::new(SelectorNode {
            previous: None,
            step,
            stop_traversal: false,
            in_template: false,
        }))
    }

    fn then(&self, step: SelectorStep) -> Self {
        let stop_traversal = matches!(
            step,
            SelectorStep::Child | SelectorStep::Descendant | SelectorStep::Template
        );
        let in_template = self.0.in_template || matches!(step, SelectorStep::Template);
        Self(Rc::new(SelectorNode {
            previous: Some(self.clone()),
            step,
            stop_traversal,
            in_template,
        }))
    }

    /// Append a step matching every control.
    pub fn any(&self) -> Self {
        self.then(SelectorStep::Any)
    }

    pub fn of_type(&self, ty: &'static ControlType) -> Self {
        self.then(SelectorStep::OfType(ty))
    }

    pub fn is(&self, ty: &'static ControlType) -> Self {
        self.then(SelectorStep::Is(ty))
    }

    pub fn class(&self, class: impl Into<String>) -> Self {
        self.then(SelectorStep::Class(class.into()))
    }

    pub fn name(&self, name: impl Into<String>) -> Self {
        self.then(SelectorStep::Name(name.into()))
    }

    /// Matches while `property` on the candidate equals `value`.
    ///
    /// Immediately false on controls the property is not registered on.
    pub fn property_equals<T>(&self, property: &'static Property<T>, value: T) -> Self
    where
        T: Clone + PartialEq + fmt::Debug + 'static,
    {
        let display = format!("{}={:?}", property.key(), value);
        let matcher: PropertyMatcher = Rc::new(move |tree: &ControlTree, id: ControlId| {
            let registered = tree
                .control_type(id)
                .is_some_and(|ty| property.is_registered_on(ty));
            if !registered {
                return SelectorMatch::FALSE;
            }
            let Ok(slot) = tree.property_slot(id, property) else {
                return SelectorMatch::FALSE;
            };
            // Inherited values resolve through the logical ancestors, nearest first.
            let mut slots = vec![slot];
            if property.inherits() {
                slots.extend(
                    tree.logical_ancestors(id)
                        .into_iter()
                        .filter_map(|a| tree.property_slot(a, property).ok()),
                );
            }
            let value = value.clone();
            SelectorMatch::Live(Activator::new(move || {
                let effective = slots
                    .iter()
                    .find_map(|slot| slot.effective::<T>())
                    .unwrap_or_else(|| property.default_value());
                effective == value
            }))
        });
        self.then(SelectorStep::PropertyEquals {
            key: property.key(),
            display,
            matcher,
        })
    }

    /// The rest of the chain must match the candidate's logical parent.
    pub fn child(&self) -> Self {
        self.then(SelectorStep::Child)
    }

    /// The rest of the chain must match some logical ancestor.
    pub fn descendant(&self) -> Self {
        self.then(SelectorStep::Descendant)
    }

    /// The rest of the chain must match the candidate's templated parent.
    pub fn template(&self) -> Self {
        self.then(SelectorStep::Template)
    }

    pub fn previous(&self) -> Option<&StyleSelector> {
        self.0.previous.as_ref()
    }

    pub fn stop_traversal(&self) -> bool {
        self.0.stop_traversal
    }

    pub fn in_template(&self) -> bool {
        self.0.in_template
    }

    /// Match the selector against `id`.
    pub fn matches(&self, tree: &ControlTree, id: ControlId) -> SelectorMatch {
        let mut live = Vec::new();
        let mut current = Some(self);
        while let Some(sel) = current {
            if sel.0.in_template && tree.templated_parent(id).is_none() {
                return SelectorMatch::FALSE;
            }
            match sel.evaluate(tree, id) {
                SelectorMatch::Immediate(false) => return SelectorMatch::FALSE,
                SelectorMatch::Immediate(true) => {}
                SelectorMatch::Live(activator) => live.push(activator),
            }
            if sel.0.stop_traversal {
                break;
            }
            current = sel.0.previous.as_ref();
        }
        SelectorMatch::all(live.into_iter().map(SelectorMatch::Live))
    }

    /// Evaluate this step alone against `id`.
    fn evaluate(&self, tree: &ControlTree, id: ControlId) -> SelectorMatch {
        match &self.0.step {
            SelectorStep::Any => SelectorMatch::Immediate(tree.contains(id)),
            SelectorStep::OfType(ty) => SelectorMatch::Immediate(tree.style_key(id) == Some(*ty)),
            SelectorStep::Is(ty) => {
                SelectorMatch::Immediate(tree.style_key(id).is_some_and(|key| key.is_a(ty)))
            }
            SelectorStep::Name(name) => {
                SelectorMatch::Immediate(tree.name(id) == Some(name.as_str()))
            }
            SelectorStep::Class(class) => match tree.classes(id) {
                Some(classes) => {
                    let class = class.clone();
                    SelectorMatch::Live(Activator::new(move || classes.contains_tracked(&class)))
                }
                None => SelectorMatch::FALSE,
            },
            SelectorStep::PropertyEquals { matcher, .. } => matcher(tree, id),
            SelectorStep::Child => {
                let Some(parent) = tree.logical_parent(id) else {
                    return SelectorMatch::FALSE;
                };
                if self.0.in_template
                    && tree.templated_parent(parent) != tree.templated_parent(id)
                {
                    return SelectorMatch::FALSE;
                }
                self.match_previous(tree, parent)
            }
            SelectorStep::Descendant => {
                let templated_parent = tree.templated_parent(id);
                let ancestors = tree
                    .logical_ancestors(id)
                    .into_iter()
                    .take_while(|&a| {
                        !self.0.in_template || tree.templated_parent(a) == templated_parent
                    });
                let mut live = Vec::new();
                for ancestor in ancestors {
                    match self.match_previous(tree, ancestor) {
                        SelectorMatch::Immediate(true) => return SelectorMatch::TRUE,
                        SelectorMatch::Immediate(false) => {}
                        SelectorMatch::Live(activator) => live.push(activator),
                    }
                }
                SelectorMatch::any(live.into_iter().map(SelectorMatch::Live))
            }
            SelectorStep::Template => match tree.templated_parent(id) {
                Some(templated_parent) => self.match_previous(tree, templated_parent),
                None => SelectorMatch::FALSE,
            },
        }
    }

    fn match_previous(&self, tree: &ControlTree, anchor: ControlId) -> SelectorMatch {
        match &self.0.previous {
            Some(previous) => previous.matches(tree, anchor),
            None => SelectorMatch::TRUE,
        }
    }
}

impl fmt::Display for StyleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(previous) = &self.0.previous {
            write!(f, "{previous}")?;
        }
        match &self.0.step {
            SelectorStep::Any => f.write_str("*"),
            SelectorStep::OfType(ty) => f.write_str(ty.name()),
            SelectorStep::Is(ty) => write!(f, ":is({ty})"),
            SelectorStep::Class(class) => write!(f, ".{class}"),
            SelectorStep::Name(name) => write!(f, "#{name}"),
            SelectorStep::PropertyEquals { display, .. } => write!(f, "[{display}]"),
            SelectorStep::Child => f.write_str(" > "),
            SelectorStep::Descendant => f.write_str(" "),
            SelectorStep::Template => f.write_str(" /template/ "),
        }
    }
}
