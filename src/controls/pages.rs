//! `Pages`: a panel that selects one of its children.

use std::rc::Rc;

use crate::error::{Result, TreeError};
use crate::property::PropertySlot;
use crate::reactive::{untrack, RwSignal, Subscription};
use crate::tree::{types, Control, ControlId, ControlTree};

use super::items::Item;
use super::panel::Panel;
use super::selection::{SelectableMixin, SelectionMixin, IS_SELECTED, SELECTED_INDEX, SELECTED_ITEM};

#[derive(Clone, Copy)]
struct PageEntry {
    id: ControlId,
    selected: PropertySlot,
}

struct PagesState {
    pages: RwSignal<Vec<PageEntry>>,
}

/// Handle to a `Pages` control.
///
/// The page list is the item list of the selection: `SelectedItem` holds the
/// selected page's id and the selected page carries `IsSelected` and the
/// `selected` class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pages(ControlId);

impl Pages {
    pub fn new(tree: &mut ControlTree) -> Result<Self> {
        Self::create(tree, Control::new(&types::PAGES))
    }

    pub fn create(tree: &mut ControlTree, control: Control) -> Result<Self> {
        let id = tree.insert(control);
        let pages: RwSignal<Vec<PageEntry>> = RwSignal::new(Vec::new());
        tree.own_signal(id, pages.read_only().id())?;
        tree.insert_extension(id, PagesState { pages })?;

        SelectionMixin::attach(tree, id, move || {
            pages
                .try_with(|p| p.iter().map(|e| Some(Item::new(e.id))).collect::<Vec<_>>())
                .map(Rc::new)
        })?;

        let index_slot = tree.property_slot(id, &SELECTED_INDEX)?;
        let mark_selected = Subscription::new(move || {
            let index = index_slot.get(&SELECTED_INDEX);
            let entries = pages.try_with(|p| p.clone()).unwrap_or_default();
            untrack(|| {
                for (i, entry) in entries.iter().enumerate() {
                    let on = i as i64 == index;
                    if entry.selected.get(&IS_SELECTED) != on {
                        entry.selected.set(on);
                    }
                }
            });
        });
        tree.add_behavior(id, mark_selected)?;
        Ok(Self(id))
    }

    pub fn id(self) -> ControlId {
        self.0
    }

    fn signal(self, tree: &ControlTree) -> Result<RwSignal<Vec<PageEntry>>> {
        tree.extension::<PagesState>(self.0)
            .map(|state| state.pages)
            .ok_or(TreeError::InvalidControl(self.0))
    }

    pub fn pages(self, tree: &ControlTree) -> Vec<ControlId> {
        self.signal(tree)
            .ok()
            .and_then(|pages| pages.with_untracked(|p| p.iter().map(|e| e.id).collect()))
            .unwrap_or_default()
    }

    /// Append `page` as a child and make it selectable.
    pub fn add_page(self, tree: &mut ControlTree, page: ControlId) -> Result<()> {
        let pages = self.signal(tree)?;
        Panel::from_id(self.0).add_child(tree, page)?;
        SelectableMixin::attach(tree, page)?;
        let selected = tree.property_slot(page, &IS_SELECTED)?;
        pages.update(|p| p.push(PageEntry { id: page, selected }));
        Ok(())
    }

    /// Remove `page`. A selected page takes the selection with it.
    ///
    /// Returns `false` if `page` is not one of the pages.
    pub fn remove_page(self, tree: &mut ControlTree, page: ControlId) -> Result<bool> {
        let pages = self.signal(tree)?;
        if !Panel::from_id(self.0).remove_child(tree, page)? {
            return Ok(false);
        }
        SelectionMixin::item_removed(tree, self.0, &Item::new(page))?;
        pages.update(|p| p.retain(|e| e.id != page));
        tree.set_value(page, &IS_SELECTED, false)?;
        Ok(true)
    }

    pub fn selected_index(self, tree: &ControlTree) -> i64 {
        tree.get_value(self.0, &SELECTED_INDEX)
    }

    pub fn selected_page(self, tree: &ControlTree) -> Option<ControlId> {
        tree.get_value(self.0, &SELECTED_ITEM)?
            .downcast_ref::<ControlId>()
            .copied()
    }

    /// Select the page at `index`; anything out of range clears the selection.
    pub fn select(self, tree: &ControlTree, index: i64) -> Result<()> {
        tree.set_value(self.0, &SELECTED_INDEX, index)
    }

    pub fn select_page(self, tree: &ControlTree, page: Option<ControlId>) -> Result<()> {
        tree.set_value(self.0, &SELECTED_ITEM, page.map(Item::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::selection::SELECTED_CLASS;
    use pretty_assertions::assert_eq;

    fn pages_with(tree: &mut ControlTree, count: usize) -> (Pages, Vec<ControlId>) {
        let pages = Pages::new(tree).unwrap();
        let ids: Vec<_> = (0..count)
            .map(|_| tree.insert(Control::new(&types::BORDER)))
            .collect();
        for &id in &ids {
            pages.add_page(tree, id).unwrap();
        }
        (pages, ids)
    }

    fn selected_classes(tree: &ControlTree, ids: &[ControlId]) -> Vec<bool> {
        ids.iter()
            .map(|&id| tree.classes(id).unwrap().contains(SELECTED_CLASS))
            .collect()
    }

    #[test]
    fn selected_page_gets_the_class() {
        let mut tree = ControlTree::new();
        let (pages, ids) = pages_with(&mut tree, 3);
        assert_eq!(pages.selected_page(&tree), None);

        pages.select(&tree, 1).unwrap();
        assert_eq!(pages.selected_page(&tree), Some(ids[1]));
        assert_eq!(selected_classes(&tree, &ids), vec![false, true, false]);

        pages.select_page(&tree, Some(ids[2])).unwrap();
        assert_eq!(pages.selected_index(&tree), 2);
        assert_eq!(selected_classes(&tree, &ids), vec![false, false, true]);

        pages.select(&tree, 7).unwrap();
        assert_eq!(pages.selected_page(&tree), None);
        assert_eq!(selected_classes(&tree, &ids), vec![false, false, false]);
    }

    #[test]
    fn removing_the_selected_page_clears_selection() {
        let mut tree = ControlTree::new();
        let (pages, ids) = pages_with(&mut tree, 2);
        pages.select(&tree, 0).unwrap();

        assert!(pages.remove_page(&mut tree, ids[0]).unwrap());
        assert_eq!(pages.selected_index(&tree), -1);
        assert_eq!(pages.selected_page(&tree), None);
        assert_eq!(pages.pages(&tree), vec![ids[1]]);
        assert!(!tree.classes(ids[0]).unwrap().contains(SELECTED_CLASS));
        assert!(!pages.remove_page(&mut tree, ids[0]).unwrap());
    }

    #[test]
    fn removing_an_earlier_page_moves_the_index() {
        let mut tree = ControlTree::new();
        let (pages, ids) = pages_with(&mut tree, 3);
        pages.select(&tree, 2).unwrap();

        pages.remove_page(&mut tree, ids[0]).unwrap();
        assert_eq!(pages.selected_index(&tree), 1);
        assert_eq!(pages.selected_page(&tree), Some(ids[2]));
        assert_eq!(selected_classes(&tree, &ids[1..]), vec![false, true]);
    }

    #[test]
    fn selected_page_keeps_its_class_across_index_shifts() {
        for _ in 0..50 {
            let mut tree = ControlTree::new();
            let (pages, ids) = pages_with(&mut tree, 3);
            pages.select(&tree, 2).unwrap();
            pages.remove_page(&mut tree, ids[0]).unwrap();

            assert_eq!(pages.selected_page(&tree), Some(ids[2]));
            assert!(tree.get_value(ids[2], &IS_SELECTED));
            assert_eq!(selected_classes(&tree, &ids[1..]), vec![false, true]);
        }
    }
}
