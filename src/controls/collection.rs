//! Collection change notifications consumed by panels and item hosts.

use std::fmt;

/// The kind of a [`CollectionChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionAction {
    Add,
    Remove,
    Replace,
    Move,
    Reset,
}

impl fmt::Display for CollectionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "Add",
            Self::Remove => "Remove",
            Self::Replace => "Replace",
            Self::Move => "Move",
            Self::Reset => "Reset",
        };
        f.write_str(name)
    }
}

/// A change to an ordered collection, with the affected items.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionChange<T> {
    /// `items` were inserted starting at `index`.
    Add { index: usize, items: Vec<T> },
    /// `items` were removed starting at `index`.
    Remove { index: usize, items: Vec<T> },
    /// `old_items` at `index` were replaced by `new_items`.
    Replace {
        index: usize,
        old_items: Vec<T>,
        new_items: Vec<T>,
    },
    /// `items` moved from `old_index` to `new_index`.
    Move {
        old_index: usize,
        new_index: usize,
        items: Vec<T>,
    },
    /// The collection changed wholesale.
    Reset,
}

impl<T> CollectionChange<T> {
    pub fn action(&self) -> CollectionAction {
        match self {
            Self::Add { .. } => CollectionAction::Add,
            Self::Remove { .. } => CollectionAction::Remove,
            Self::Replace { .. } => CollectionAction::Replace,
            Self::Move { .. } => CollectionAction::Move,
            Self::Reset => CollectionAction::Reset,
        }
    }
}
