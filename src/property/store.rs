//! Per-control value storage: the layered value stack behind each property.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::reactive::{untrack, RwSignal};

use super::Property;

/// A type-erased property value.
pub type AnyValue = Rc<dyn Any>;

/// Type-erased coercion applied to every value written into a slot.
pub(crate) type Coercion = Rc<dyn Fn(AnyValue) -> AnyValue>;

/// Where a value written to a property comes from.
///
/// A local value always wins over style values; among style values the
/// highest style order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingPriority {
    /// Set directly on the control.
    LocalValue,
    /// Set by the style at this position in the style list.
    Style(usize),
}

// ---------------------------------------------------------------------------
// ValueStack
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub(crate) struct ValueStack {
    local: Option<AnyValue>,
    styles: BTreeMap<usize, AnyValue>,
    coerce: Option<Coercion>,
}

impl ValueStack {
    fn effective(&self) -> Option<&AnyValue> {
        self.local
            .as_ref()
            .or_else(|| self.styles.values().next_back())
    }
}

// ---------------------------------------------------------------------------
// PropertySlot
// ---------------------------------------------------------------------------

/// Reactive storage for one property on one control.
///
/// `Copy`: effects and selector activators capture slots directly, so they
/// can read and write property values without borrowing the tree. Reads made
/// inside an effect subscribe it to the slot.
///
/// A slot only knows its own layers. Inheritance through the logical tree is
/// resolved by [`ControlTree::get_value`](crate::tree::ControlTree::get_value).
#[derive(Clone, Copy)]
pub struct PropertySlot {
    stack: RwSignal<ValueStack>,
}

impl fmt::Debug for PropertySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySlot").field("stack", &self.stack).finish()
    }
}

impl PropertySlot {
    pub(crate) fn new() -> Self {
        Self {
            stack: RwSignal::new(ValueStack::default()),
        }
    }

    /// Tracked read of the effective value, or the property default.
    pub fn get<T: Clone + 'static>(&self, property: &Property<T>) -> T {
        self.stack
            .try_with(|s| s.effective().and_then(|v| v.downcast_ref::<T>().cloned()))
            .flatten()
            .unwrap_or_else(|| property.default_value())
    }

    /// Untracked read of the effective value, or the property default.
    pub fn get_untracked<T: Clone + 'static>(&self, property: &Property<T>) -> T {
        untrack(|| self.get(property))
    }

    /// Tracked read of the effective value, `None` when no layer is set.
    pub(crate) fn effective<T: Clone + 'static>(&self) -> Option<T> {
        self.stack
            .try_with(|s| s.effective().and_then(|v| v.downcast_ref::<T>().cloned()))
            .flatten()
    }

    /// Untracked read of the effective value, `None` when no layer is set.
    pub(crate) fn effective_untracked<T: Clone + 'static>(&self) -> Option<T> {
        self.stack
            .with_untracked(|s| s.effective().and_then(|v| v.downcast_ref::<T>().cloned()))
            .flatten()
    }

    /// Whether a local value is set.
    pub fn has_local_value(&self) -> bool {
        self.stack
            .with_untracked(|s| s.local.is_some())
            .unwrap_or(false)
    }

    /// Write a local value. Coercion runs first.
    pub fn set<T: Clone + PartialEq + 'static>(&self, value: T) {
        let value = self.coerced(Rc::new(value));
        let unchanged = self
            .stack
            .with_untracked(|s| {
                let current = s.local.as_ref().and_then(|v| v.downcast_ref::<T>());
                current.is_some() && current == value.downcast_ref::<T>()
            })
            .unwrap_or(true);
        if !unchanged {
            self.stack.update(|s| s.local = Some(value));
        }
    }

    /// Write a type-erased value at the given priority. Coercion runs first.
    pub fn set_raw(&self, priority: BindingPriority, value: AnyValue) {
        let value = self.coerced(value);
        self.stack.update(|s| match priority {
            BindingPriority::LocalValue => s.local = Some(value),
            BindingPriority::Style(order) => {
                s.styles.insert(order, value);
            }
        });
    }

    /// Remove the value at the given priority, if any.
    pub fn clear(&self, priority: BindingPriority) {
        let present = self
            .stack
            .with_untracked(|s| match priority {
                BindingPriority::LocalValue => s.local.is_some(),
                BindingPriority::Style(order) => s.styles.contains_key(&order),
            })
            .unwrap_or(false);
        if present {
            self.stack.update(|s| match priority {
                BindingPriority::LocalValue => s.local = None,
                BindingPriority::Style(order) => {
                    s.styles.remove(&order);
                }
            });
        }
    }

    /// Remove every style layer.
    pub(crate) fn clear_styles(&self) {
        let any = self
            .stack
            .with_untracked(|s| !s.styles.is_empty())
            .unwrap_or(false);
        if any {
            self.stack.update(|s| s.styles.clear());
        }
    }

    /// Install a coercion function and re-coerce the values already stored.
    pub fn set_coercion<T: Clone + 'static>(&self, coerce: impl Fn(T) -> T + 'static) {
        let erased: Coercion = Rc::new(move |value: AnyValue| match value.downcast_ref::<T>() {
            Some(v) => Rc::new(coerce(v.clone())) as AnyValue,
            None => value,
        });
        let installed = erased.clone();
        self.stack.update(move |s| s.coerce = Some(installed));
        self.apply_coercion(&erased);
    }

    /// Re-run the installed coercion over the stored values.
    ///
    /// Used when the state the coercion depends on changes.
    pub fn recoerce(&self) {
        if let Some(coerce) = self.stack.with_untracked(|s| s.coerce.clone()).flatten() {
            self.apply_coercion(&coerce);
        }
    }

    fn apply_coercion(&self, coerce: &Coercion) {
        let Some((local, styles)) = self
            .stack
            .with_untracked(|s| (s.local.clone(), s.styles.clone()))
        else {
            return;
        };
        let (local, styles) = untrack(|| {
            let local = local.map(|v| coerce(v));
            let styles: BTreeMap<usize, AnyValue> =
                styles.into_iter().map(|(k, v)| (k, coerce(v))).collect();
            (local, styles)
        });
        self.stack.update(move |s| {
            s.local = local;
            s.styles = styles;
        });
    }

    fn coerced(&self, value: AnyValue) -> AnyValue {
        match self.stack.with_untracked(|s| s.coerce.clone()).flatten() {
            Some(coerce) => untrack(|| coerce(value)),
            None => value,
        }
    }

    pub(crate) fn dispose(&self) {
        self.stack.dispose();
    }
}
