//! Selection behaviors.
//!
//! [`SelectionMixin`] couples `SelectedIndex` and `SelectedItem` on any
//! control that can hand out its item list. [`SelectableMixin`] mirrors
//! `IsSelected` onto the `selected` class of an individual item.
//!
//! Both are wired with effects owned by the control, so they live exactly as
//! long as the control does.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::{Result, TreeError};
use crate::logging::targets;
use crate::property::Property;
use crate::reactive::{untrack, Subscription};
use crate::tree::{types, ControlId, ControlTree};

use super::items::{index_of, Item, Items};

/// Index of the selected item, `-1` for none.
pub static SELECTED_INDEX: Property<i64> =
    Property::attached(&types::CONTROL, "SelectedIndex", || -1);

/// The selected item, `None` for none.
pub static SELECTED_ITEM: Property<Option<Item>> =
    Property::attached(&types::CONTROL, "SelectedItem", || None);

/// Whether an item container is the selected one.
pub static IS_SELECTED: Property<bool> =
    Property::attached(&types::CONTROL, "IsSelected", || false);

/// Class carried by selected item containers.
pub const SELECTED_CLASS: &str = "selected";

fn item_at(list: &[Option<Item>], index: i64) -> Option<Item> {
    let index = usize::try_from(index).ok()?;
    list.get(index).cloned().flatten()
}

fn position(list: &[Option<Item>], item: &Item) -> i64 {
    index_of(list, item).map_or(-1, |i| i as i64)
}

/// Keeps `SelectedIndex` and `SelectedItem` consistent.
///
/// After every mutation either both say "nothing" (`-1` and `None`) or the
/// index points at the selected item. Values that would break this are
/// coerced to "nothing" rather than rejected.
pub struct SelectionMixin;

impl SelectionMixin {
    /// Attach the selection behavior to `control`.
    ///
    /// `items` returns the current item list, or `None` while there is no
    /// source yet, which counts as an empty list. Signals it reads are
    /// tracked, so a change to the list re-synchronises the selection.
    pub fn attach(
        tree: &mut ControlTree,
        control: ControlId,
        items: impl Fn() -> Option<Items> + 'static,
    ) -> Result<()> {
        let items: Rc<dyn Fn() -> Items> = Rc::new(move || items().unwrap_or_default());
        let index_slot = tree.property_slot(control, &SELECTED_INDEX)?;
        let item_slot = tree.property_slot(control, &SELECTED_ITEM)?;

        let source = items.clone();
        index_slot.set_coercion(move |index: i64| match item_at(&source(), index) {
            Some(_) => index,
            None => -1,
        });
        let source = items.clone();
        item_slot.set_coercion(move |item: Option<Item>| {
            let list = source();
            item.filter(|item| index_of(&list, item).is_some())
        });

        let source = items.clone();
        let index_to_item = Subscription::new(move || {
            let index = index_slot.get(&SELECTED_INDEX);
            untrack(|| {
                let item = item_at(&source(), index);
                if item_slot.get(&SELECTED_ITEM) != item {
                    item_slot.set(item);
                }
            });
        });

        let source = items.clone();
        let item_to_index = Subscription::new(move || {
            let item = item_slot.get(&SELECTED_ITEM);
            untrack(|| {
                let list = source();
                let current = index_slot.get(&SELECTED_INDEX);
                let index = match &item {
                    None => -1,
                    // Keep the current index when it already points at an
                    // equal item; lists may hold duplicates.
                    Some(item) if item_at(&list, current).as_ref() == Some(item) => current,
                    Some(item) => position(&list, item),
                };
                if index != current {
                    index_slot.set(index);
                }
            });
        });

        let items_changed = Subscription::new(move || {
            let list = items();
            untrack(|| match item_slot.get(&SELECTED_ITEM) {
                Some(item) if index_of(&list, &item).is_some() => {
                    let current = index_slot.get(&SELECTED_INDEX);
                    if item_at(&list, current).as_ref() != Some(&item) {
                        index_slot.set(position(&list, &item));
                    }
                }
                Some(item) => {
                    tracing::trace!(
                        target: targets::ITEMS,
                        ?control,
                        %item,
                        "selected item left the list"
                    );
                    item_slot.set(None::<Item>);
                }
                None => {
                    if index_slot.get(&SELECTED_INDEX) != -1 {
                        index_slot.set(-1i64);
                    }
                }
            });
        });

        tree.add_behavior(control, index_to_item)?;
        tree.add_behavior(control, item_to_index)?;
        tree.add_behavior(control, items_changed)
    }

    /// Clear the selection of `control` if `item` is the selected item.
    pub fn item_removed(tree: &ControlTree, control: ControlId, item: &Item) -> Result<()> {
        if tree.get_value(control, &SELECTED_ITEM).as_ref() == Some(item) {
            tree.set_value(control, &SELECTED_ITEM, None)?;
        }
        Ok(())
    }
}

/// Keeps `IsSelected` and the `selected` class of a control in step.
pub struct SelectableMixin;

impl SelectableMixin {
    /// Attach the behavior. A control that starts with either the class or
    /// the property set starts selected.
    pub fn attach(tree: &mut ControlTree, control: ControlId) -> Result<()> {
        let slot = tree.property_slot(control, &IS_SELECTED)?;
        let classes = tree.classes(control).ok_or(TreeError::InvalidControl(control))?;

        let initial = slot.get_untracked(&IS_SELECTED) || classes.contains(SELECTED_CLASS);
        classes.set(SELECTED_CLASS, initial);
        if slot.get_untracked(&IS_SELECTED) != initial {
            slot.set(initial);
        }

        // The class value last synced in either direction. A queued class
        // effect that still sees this value has nothing new to report.
        let synced = Rc::new(Cell::new(initial));

        let last = synced.clone();
        let to_class = Subscription::new(move || {
            let on = slot.get(&IS_SELECTED);
            untrack(|| {
                last.set(on);
                classes.set(SELECTED_CLASS, on);
            });
        });
        let from_class = Subscription::new(move || {
            let on = classes.contains_tracked(SELECTED_CLASS);
            if on == synced.get() {
                return;
            }
            synced.set(on);
            untrack(|| {
                if slot.get(&IS_SELECTED) != on {
                    slot.set(on);
                }
            });
        });
        tree.add_behavior(control, to_class)?;
        tree.add_behavior(control, from_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::items::items;
    use crate::reactive::RwSignal;
    use crate::tree::Control;
    use pretty_assertions::assert_eq;

    fn selector(tree: &mut ControlTree, list: Items) -> (ControlId, RwSignal<Items>) {
        let id = tree.insert(Control::new(&types::CONTROL));
        let source = RwSignal::new(list);
        SelectionMixin::attach(tree, id, move || Some(source.get())).unwrap();
        (id, source)
    }

    fn selection(tree: &ControlTree, id: ControlId) -> (i64, Option<Item>) {
        (tree.get_value(id, &SELECTED_INDEX), tree.get_value(id, &SELECTED_ITEM))
    }

    #[test]
    fn index_drives_item() {
        let mut tree = ControlTree::new();
        let (id, _) = selector(&mut tree, items([Some("a"), Some("b")]));
        assert_eq!(selection(&tree, id), (-1, None));

        tree.set_value(id, &SELECTED_INDEX, 1).unwrap();
        assert_eq!(selection(&tree, id), (1, Some(Item::from("b"))));
    }

    #[test]
    fn item_drives_index() {
        let mut tree = ControlTree::new();
        let (id, _) = selector(&mut tree, items([Some("a"), Some("b")]));
        tree.set_value(id, &SELECTED_ITEM, Some(Item::from("a"))).unwrap();
        assert_eq!(selection(&tree, id), (0, Some(Item::from("a"))));

        tree.set_value(id, &SELECTED_ITEM, None).unwrap();
        assert_eq!(selection(&tree, id), (-1, None));
    }

    #[test]
    fn out_of_range_values_clear_the_selection() {
        let mut tree = ControlTree::new();
        let (id, _) = selector(&mut tree, items([Some("a"), None, Some("c")]));
        tree.set_value(id, &SELECTED_INDEX, 0).unwrap();

        for bad in [3, 42, -2, 1] {
            tree.set_value(id, &SELECTED_INDEX, 0).unwrap();
            tree.set_value(id, &SELECTED_INDEX, bad).unwrap();
            assert_eq!(selection(&tree, id), (-1, None), "index {bad}");
        }

        tree.set_value(id, &SELECTED_ITEM, Some(Item::from("zzz"))).unwrap();
        assert_eq!(selection(&tree, id), (-1, None));
    }

    #[test]
    fn list_changes_resync_the_index() {
        let mut tree = ControlTree::new();
        let (id, source) = selector(&mut tree, items([Some("a"), Some("b")]));
        tree.set_value(id, &SELECTED_INDEX, 1).unwrap();

        source.set(items([Some("x"), Some("a"), Some("b")]));
        assert_eq!(selection(&tree, id), (2, Some(Item::from("b"))));

        source.set(items([Some("x")]));
        assert_eq!(selection(&tree, id), (-1, None));
    }

    #[test]
    fn item_removed_clears_only_the_selected_item() {
        let mut tree = ControlTree::new();
        let (id, _) = selector(&mut tree, items([Some("a"), Some("b")]));
        tree.set_value(id, &SELECTED_INDEX, 0).unwrap();

        SelectionMixin::item_removed(&tree, id, &Item::from("b")).unwrap();
        assert_eq!(selection(&tree, id), (0, Some(Item::from("a"))));

        SelectionMixin::item_removed(&tree, id, &Item::from("a")).unwrap();
        assert_eq!(selection(&tree, id), (-1, None));
    }

    #[test]
    fn missing_source_is_an_empty_list() {
        let mut tree = ControlTree::new();
        let id = tree.insert(Control::new(&types::CONTROL));
        SelectionMixin::attach(&mut tree, id, || None).unwrap();
        tree.set_value(id, &SELECTED_INDEX, 0).unwrap();
        assert_eq!(selection(&tree, id), (-1, None));
    }

    #[test]
    fn selectable_mirrors_class() {
        let mut tree = ControlTree::new();
        let id = tree.insert(Control::new(&types::BORDER));
        SelectableMixin::attach(&mut tree, id).unwrap();
        let classes = tree.classes(id).unwrap();
        assert!(!classes.contains(SELECTED_CLASS));

        tree.set_value(id, &IS_SELECTED, true).unwrap();
        assert!(classes.contains(SELECTED_CLASS));

        classes.remove(SELECTED_CLASS);
        assert!(!tree.get_value(id, &IS_SELECTED));
    }

    #[test]
    fn selectable_ignores_stale_class_notifications() {
        let mut tree = ControlTree::new();
        let id = tree.insert(Control::new(&types::BORDER));
        SelectableMixin::attach(&mut tree, id).unwrap();
        let slot = tree.property_slot(id, &IS_SELECTED).unwrap();
        let classes = tree.classes(id).unwrap();

        // Flip the property twice inside one effect pass, so the class
        // effects run interleaved with the property effects.
        let driver = RwSignal::new(0);
        let _flip = Subscription::new(move || {
            if driver.get() > 0 {
                untrack(|| {
                    slot.set(false);
                    slot.set(true);
                });
            }
        });
        tree.set_value(id, &IS_SELECTED, true).unwrap();
        driver.set(1);
        assert!(tree.get_value(id, &IS_SELECTED));
        assert!(classes.contains(SELECTED_CLASS));
    }

    #[test]
    fn selectable_starts_from_existing_class() {
        let mut tree = ControlTree::new();
        let id = tree.insert(Control::new(&types::BORDER).with_class(SELECTED_CLASS));
        SelectableMixin::attach(&mut tree, id).unwrap();
        assert!(tree.get_value(id, &IS_SELECTED));
    }
}
