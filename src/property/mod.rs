//! Typed property handles and the per-control value API.
//!
//! A [`Property`] is a `static` descriptor. Values live in reactive
//! [`PropertySlot`]s created on first use, so anything reading a property
//! inside an effect is re-run when the value changes.

pub mod store;

use std::fmt;

use crate::error::Result;
use crate::reactive::{untrack, Subscription};
use crate::tree::{ControlId, ControlTree, ControlType};

pub use store::{AnyValue, BindingPriority, PropertySlot};

// ---------------------------------------------------------------------------
// Property
// ---------------------------------------------------------------------------

/// Identity of a property: owning type name plus property name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey {
    pub owner: &'static str,
    pub name: &'static str,
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

/// A typed property descriptor.
///
/// ```ignore
/// pub static WIDTH: Property<i64> = Property::new(&types::CONTROL, "Width", Default::default);
/// ```
pub struct Property<T: 'static> {
    owner: &'static ControlType,
    name: &'static str,
    default: fn() -> T,
    inherits: bool,
    attached: bool,
}

impl<T: 'static> Property<T> {
    const fn build(
        owner: &'static ControlType,
        name: &'static str,
        default: fn() -> T,
        inherits: bool,
        attached: bool,
    ) -> Self {
        Self {
            owner,
            name,
            default,
            inherits,
            attached,
        }
    }

    /// A property registered on `owner` and every type deriving from it.
    pub const fn new(owner: &'static ControlType, name: &'static str, default: fn() -> T) -> Self {
        Self::build(owner, name, default, false, false)
    }

    /// A property whose unset value comes from the logical parent.
    pub const fn inherited(
        owner: &'static ControlType,
        name: &'static str,
        default: fn() -> T,
    ) -> Self {
        Self::build(owner, name, default, true, false)
    }

    /// A property that can be set on any control.
    pub const fn attached(
        owner: &'static ControlType,
        name: &'static str,
        default: fn() -> T,
    ) -> Self {
        Self::build(owner, name, default, false, true)
    }

    /// An attached property that also inherits.
    pub const fn attached_inherited(
        owner: &'static ControlType,
        name: &'static str,
        default: fn() -> T,
    ) -> Self {
        Self::build(owner, name, default, true, true)
    }

    pub fn key(&self) -> PropertyKey {
        PropertyKey {
            owner: self.owner.name(),
            name: self.name,
        }
    }

    pub fn owner(&self) -> &'static ControlType {
        self.owner
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn default_value(&self) -> T {
        (self.default)()
    }

    pub fn inherits(&self) -> bool {
        self.inherits
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether controls of type `ty` carry this property.
    pub fn is_registered_on(&self, ty: &ControlType) -> bool {
        self.attached || ty.is_a(self.owner)
    }
}

impl<T: 'static> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A change notification: `(sender, old, new)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange<T> {
    pub sender: ControlId,
    pub old: T,
    pub new: T,
}

// ---------------------------------------------------------------------------
// Tree API
// ---------------------------------------------------------------------------

impl ControlTree {
    /// The slot holding `property` on `id`, created on first use.
    pub fn property_slot<T: 'static>(
        &self,
        id: ControlId,
        property: &Property<T>,
    ) -> Result<PropertySlot> {
        Ok(self.node(id)?.slot_or_insert(property.key()))
    }

    pub(crate) fn slot_by_key(&self, id: ControlId, key: PropertyKey) -> Result<PropertySlot> {
        Ok(self.node(id)?.slot_or_insert(key))
    }

    pub(crate) fn existing_slot(&self, id: ControlId, key: PropertyKey) -> Option<PropertySlot> {
        self.nodes.get(id)?.slot(key)
    }

    /// Effective value of `property` on `id`.
    ///
    /// Local value, else the winning style value, else (for inheriting
    /// properties) the value on the logical parent, else the default.
    pub fn get_value<T: Clone + 'static>(&self, id: ControlId, property: &Property<T>) -> T {
        let mut current = Some(id);
        while let Some(cid) = current {
            if let Some(v) = self
                .existing_slot(cid, property.key())
                .and_then(|slot| slot.effective_untracked::<T>())
            {
                return v;
            }
            if !property.inherits() {
                break;
            }
            current = self.logical_parent(cid);
        }
        property.default_value()
    }

    /// Set the local value of `property` on `id`.
    pub fn set_value<T: Clone + PartialEq + 'static>(
        &self,
        id: ControlId,
        property: &Property<T>,
        value: T,
    ) -> Result<()> {
        self.property_slot(id, property)?.set(value);
        Ok(())
    }

    /// Remove the local value of `property` on `id`.
    pub fn clear_value<T: 'static>(&self, id: ControlId, property: &Property<T>) -> Result<()> {
        if let Some(slot) = self.existing_slot(id, property.key()) {
            slot.clear(BindingPriority::LocalValue);
        }
        Ok(())
    }

    /// Install a per-instance coercion for `property` on `id`.
    pub fn set_coercion<T: Clone + 'static>(
        &self,
        id: ControlId,
        property: &Property<T>,
        coerce: impl Fn(T) -> T + 'static,
    ) -> Result<()> {
        self.property_slot(id, property)?.set_coercion(coerce);
        Ok(())
    }

    /// Call `f` with `(sender, old, new)` whenever the slot value of
    /// `property` on `id` changes. Inherited values are not observed.
    pub fn observe<T: Clone + PartialEq + 'static>(
        &self,
        id: ControlId,
        property: &'static Property<T>,
        mut f: impl FnMut(PropertyChange<T>) + 'static,
    ) -> Result<Subscription> {
        let slot = self.property_slot(id, property)?;
        let mut last: Option<T> = None;
        Ok(Subscription::new(move || {
            let value = slot.get(property);
            match last.replace(value.clone()) {
                Some(old) if old != value => untrack(|| {
                    f(PropertyChange {
                        sender: id,
                        old,
                        new: value,
                    })
                }),
                _ => {}
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{types, Control};
    use std::cell::RefCell;

    static WIDTH: Property<i64> = Property::new(&types::CONTROL, "Width", Default::default);
    static PADDING: Property<i64> = Property::new(&types::DECORATOR, "Padding", Default::default);
    static FONT: Property<String> = Property::inherited(&types::CONTROL, "Font", String::new);
    static ROW: Property<i64> = Property::attached(&types::PANEL, "Row", Default::default);

    #[test]
    fn registration_follows_type_chain() {
        assert!(WIDTH.is_registered_on(&types::BORDER));
        assert!(PADDING.is_registered_on(&types::BORDER));
        assert!(!PADDING.is_registered_on(&types::STACK_PANEL));
        assert!(ROW.is_registered_on(&types::TEXT_BLOCK));
        assert_eq!(PADDING.key().to_string(), "Decorator.Padding");
    }

    #[test]
    fn set_get_clear() {
        let mut tree = ControlTree::new();
        let c = tree.insert(Control::new(&types::BORDER));
        assert_eq!(tree.get_value(c, &WIDTH), 0);
        tree.set_value(c, &WIDTH, 12).unwrap();
        assert_eq!(tree.get_value(c, &WIDTH), 12);
        tree.clear_value(c, &WIDTH).unwrap();
        assert_eq!(tree.get_value(c, &WIDTH), 0);
    }

    #[test]
    fn inherited_value_follows_logical_parent() {
        let mut tree = ControlTree::new();
        let parent = tree.insert(Control::new(&types::STACK_PANEL));
        let child = tree.insert(Control::new(&types::BORDER));
        tree.add_logical_child(parent, child).unwrap();
        tree.set_value(parent, &FONT, "Mono".to_string()).unwrap();
        assert_eq!(tree.get_value(child, &FONT), "Mono");
        tree.set_value(child, &FONT, "Sans".to_string()).unwrap();
        assert_eq!(tree.get_value(child, &FONT), "Sans");

        tree.set_value(parent, &WIDTH, 4).unwrap();
        assert_eq!(tree.get_value(child, &WIDTH), 0);
    }

    #[test]
    fn observe_reports_changes_only() {
        let mut tree = ControlTree::new();
        let c = tree.insert(Control::new(&types::BORDER));
        let log = std::rc::Rc::new(RefCell::new(Vec::new()));
        let log_c = log.clone();
        let sub = tree
            .observe(c, &WIDTH, move |change| {
                log_c.borrow_mut().push((change.old, change.new))
            })
            .unwrap();
        tree.set_value(c, &WIDTH, 1).unwrap();
        tree.set_value(c, &WIDTH, 1).unwrap();
        tree.set_value(c, &WIDTH, 3).unwrap();
        drop(sub);
        tree.set_value(c, &WIDTH, 5).unwrap();
        assert_eq!(*log.borrow(), vec![(0, 1), (1, 3)]);
    }

    #[test]
    fn coercion_through_tree() {
        let mut tree = ControlTree::new();
        let c = tree.insert(Control::new(&types::BORDER));
        tree.set_coercion(c, &WIDTH, |v: i64| v.max(0)).unwrap();
        tree.set_value(c, &WIDTH, -7).unwrap();
        assert_eq!(tree.get_value(c, &WIDTH), 0);
    }
}
