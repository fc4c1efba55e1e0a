//! Styles, style sets and the styler that applies them on attach.
//!
//! A style pairs a selector with property setters. When a control attaches to
//! a visual root every style is matched against it: an immediate match writes
//! the setters once, a live match subscribes and toggles them as the match
//! changes. Style values land in the property's `Style(order)` layer, so a
//! later style wins over an earlier one and a local value wins over both.

use std::fmt;
use std::rc::Rc;

use crate::logging::targets;
use crate::property::{AnyValue, BindingPriority, Property, PropertyKey, PropertySlot};
use crate::tree::{ControlId, ControlTree};

use super::activator::SelectorMatch;
use super::selector::StyleSelector;

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// One property assignment made by a style.
#[derive(Clone)]
pub struct Setter {
    key: PropertyKey,
    value: AnyValue,
}

impl Setter {
    pub fn key(&self) -> PropertyKey {
        self.key
    }
}

impl fmt::Debug for Setter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter").field("key", &self.key).finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct Style {
    selector: StyleSelector,
    setters: Vec<Setter>,
}

impl Style {
    pub fn new(selector: StyleSelector) -> Self {
        Self {
            selector,
            setters: Vec::new(),
        }
    }

    /// Add a setter (builder).
    pub fn with_setter<T: 'static>(mut self, property: &'static Property<T>, value: T) -> Self {
        self.setters.push(Setter {
            key: property.key(),
            value: Rc::new(value),
        });
        self
    }

    pub fn selector(&self) -> &StyleSelector {
        &self.selector
    }

    pub fn setters(&self) -> &[Setter] {
        &self.setters
    }
}

/// An ordered list of styles. Position is priority: later wins.
#[derive(Clone, Debug, Default)]
pub struct Styles {
    styles: Vec<Style>,
}

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, style: Style) {
        self.styles.push(style);
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Style> {
        self.styles.iter()
    }
}

impl FromIterator<Style> for Styles {
    fn from_iter<I: IntoIterator<Item = Style>>(iter: I) -> Self {
        Self {
            styles: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Styler
// ---------------------------------------------------------------------------

impl ControlTree {
    /// Match every configured style against `id` and wire up its setters.
    pub(crate) fn apply_styles(&mut self, id: ControlId) {
        let styles = self.config().styles.clone();
        let mut subscriptions = Vec::new();

        for (order, style) in styles.iter().enumerate() {
            let selector = style.selector().clone();
            let m = selector.matches(self, id);
            if m.is_immediate_false() {
                continue;
            }
            let assignments: Vec<(PropertySlot, AnyValue)> = style
                .setters()
                .iter()
                .filter_map(|s| Some((self.slot_by_key(id, s.key).ok()?, s.value.clone())))
                .collect();
            let priority = BindingPriority::Style(order);

            match m {
                SelectorMatch::Immediate(_) => {
                    tracing::trace!(target: targets::STYLING, ?id, %selector, "style applied");
                    for (slot, value) in &assignments {
                        slot.set_raw(priority, value.clone());
                    }
                }
                SelectorMatch::Live(activator) => {
                    subscriptions.push(activator.subscribe(move |active| {
                        tracing::trace!(
                            target: targets::STYLING,
                            ?id,
                            %selector,
                            active,
                            "style toggled"
                        );
                        for (slot, value) in &assignments {
                            if active {
                                slot.set_raw(priority, value.clone());
                            } else {
                                slot.clear(priority);
                            }
                        }
                    }));
                }
            }
        }

        if let Ok(node) = self.node_mut(id) {
            node.style_subscriptions.extend(subscriptions);
        }
    }
}
