//! Data items shown by item hosts.
//!
//! An [`Item`] is a type-erased, comparable value. Item hosts hold an
//! [`Items`] list where `None` marks a null entry that gets no container.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::property::Property;
use crate::tree::types;

/// Any value that can be shown as an item.
///
/// Implemented for every `Any + Debug + PartialEq` type.
pub trait ItemData: fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn eq_item(&self, other: &dyn ItemData) -> bool;
}

impl<T: Any + fmt::Debug + PartialEq> ItemData for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_item(&self, other: &dyn ItemData) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }
}

/// A shared data item. Equality compares the underlying values.
#[derive(Clone)]
pub struct Item(Rc<dyn ItemData>);

impl Item {
    pub fn new<T: ItemData + 'static>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Display text: strings as-is, anything else through `Debug`.
    pub fn text(&self) -> String {
        match self.downcast_ref::<String>() {
            Some(s) => s.clone(),
            None => format!("{:?}", self.0),
        }
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0.eq_item(&*other.0)
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl From<&str> for Item {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for Item {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// An immutable snapshot of an item list. `None` entries are null items.
pub type Items = Rc<Vec<Option<Item>>>;

/// Build an [`Items`] list.
///
/// ```ignore
/// let list = items([Some("Foo"), None, Some("Bar")]);
/// ```
pub fn items<I: Into<Item>>(values: impl IntoIterator<Item = Option<I>>) -> Items {
    Rc::new(values.into_iter().map(|v| v.map(Into::into)).collect())
}

/// Position of `item` in `list`.
pub fn index_of(list: &[Option<Item>], item: &Item) -> Option<usize> {
    list.iter().position(|entry| entry.as_ref() == Some(item))
}

/// The item list of an item host.
pub static ITEMS: Property<Items> = Property::new(&types::REPEAT, "Items", || Rc::new(Vec::new()));

/// The data a control presents. Inherited down the logical tree.
pub static DATA_CONTEXT: Property<Option<Item>> =
    Property::attached_inherited(&types::CONTROL, "DataContext", || None);
