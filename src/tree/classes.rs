//! Observable class sets.

use std::fmt;

use indexmap::IndexSet;

use crate::reactive::RwSignal;

/// An ordered, de-duplicated set of class names with change notification.
///
/// `Copy` handle onto a signal, so a live `Class` selector match can watch the
/// set without borrowing the tree. Mutations only notify when the set
/// actually changes. Membership tests are O(1).
#[derive(Clone, Copy)]
pub struct Classes {
    set: RwSignal<IndexSet<String>>,
}

impl fmt::Debug for Classes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}

impl Classes {
    pub(crate) fn new(initial: impl IntoIterator<Item = String>) -> Self {
        Self {
            set: RwSignal::new(initial.into_iter().collect()),
        }
    }

    /// Add a class. Returns `false` if it was already present.
    pub fn add(&self, class: &str) -> bool {
        if self.contains(class) {
            return false;
        }
        self.set.update(|s| {
            s.insert(class.to_string());
        });
        true
    }

    /// Remove a class. Returns `false` if it was not present.
    pub fn remove(&self, class: &str) -> bool {
        if !self.contains(class) {
            return false;
        }
        self.set.update(|s| {
            s.shift_remove(class);
        });
        true
    }

    /// Add the class if `on`, otherwise remove it.
    pub fn set(&self, class: &str, on: bool) {
        if on {
            self.add(class);
        } else {
            self.remove(class);
        }
    }

    pub fn toggle(&self, class: &str) {
        let on = !self.contains(class);
        self.set(class, on);
    }

    /// Untracked membership test.
    pub fn contains(&self, class: &str) -> bool {
        self.set
            .with_untracked(|s| s.contains(class))
            .unwrap_or(false)
    }

    /// Membership test that subscribes the running effect to the set.
    pub fn contains_tracked(&self, class: &str) -> bool {
        self.set.try_with(|s| s.contains(class)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.set.with_untracked(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Classes in insertion order.
    pub fn to_vec(&self) -> Vec<String> {
        self.set
            .with_untracked(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn dispose(&self) {
        self.set.dispose();
    }
}
