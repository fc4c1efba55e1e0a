//! `Repeat`: an items host that builds one container per non-null item.

use std::rc::Rc;

use crate::error::{Result, TreeError};
use crate::tree::{types, Control, ControlId, ControlTree};

use super::collection::{CollectionAction, CollectionChange};
use super::generator::{ItemContainerGenerator, ItemTemplate};
use super::items::{Item, Items, ITEMS};

/// Handle to a `Repeat` control.
///
/// Containers are the control's visual and logical children, ordered like
/// their items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Repeat(ControlId);

impl Repeat {
    pub fn new(tree: &mut ControlTree) -> Result<Self> {
        Self::create(tree, Control::new(&types::REPEAT))
    }

    pub fn create(tree: &mut ControlTree, control: Control) -> Result<Self> {
        let id = tree.insert(control);
        tree.insert_extension(id, ItemContainerGenerator::new(id, ItemTemplate::default()))?;
        Ok(Self(id))
    }

    pub fn id(self) -> ControlId {
        self.0
    }

    pub fn items(self, tree: &ControlTree) -> Items {
        tree.get_value(self.0, &ITEMS)
    }

    /// Containers in item order.
    pub fn containers(self, tree: &ControlTree) -> Vec<ControlId> {
        tree.extension::<ItemContainerGenerator>(self.0)
            .map(ItemContainerGenerator::containers)
            .unwrap_or_default()
    }

    pub fn container_from_index(self, tree: &ControlTree, index: usize) -> Option<ControlId> {
        tree.extension::<ItemContainerGenerator>(self.0)?
            .container_from_index(index)
    }

    pub fn index_from_container(self, tree: &ControlTree, container: ControlId) -> Option<usize> {
        tree.extension::<ItemContainerGenerator>(self.0)?
            .index_from_container(container)
    }

    /// Replace the item list and regenerate every container.
    pub fn set_items(self, tree: &mut ControlTree, items: Items) -> Result<()> {
        tree.set_value(self.0, &ITEMS, items)?;
        self.regenerate(tree)
    }

    /// Replace the item template and regenerate every container.
    pub fn set_item_template(self, tree: &mut ControlTree, template: ItemTemplate) -> Result<()> {
        self.with_generator(tree, |_, gen| {
            gen.set_template(template);
            Ok(())
        })?;
        self.regenerate(tree)
    }

    /// Apply a change to the item list: update `Items` and the containers.
    ///
    /// `Replace` is a removal followed by an insertion, `Reset` regenerates
    /// everything from the current `Items`, and `Move` is rejected.
    pub fn items_changed(
        self,
        tree: &mut ControlTree,
        change: CollectionChange<Option<Item>>,
    ) -> Result<()> {
        match change {
            CollectionChange::Add { index, items } => self.insert_items(tree, index, items),
            CollectionChange::Remove { index, items } => {
                self.remove_items(tree, index, items.len())
            }
            CollectionChange::Replace {
                index,
                old_items,
                new_items,
            } => {
                self.remove_items(tree, index, old_items.len())?;
                self.insert_items(tree, index, new_items)
            }
            CollectionChange::Move { .. } => {
                Err(TreeError::UnsupportedCollectionAction(CollectionAction::Move))
            }
            CollectionChange::Reset => self.regenerate(tree),
        }
    }

    fn insert_items(
        self,
        tree: &mut ControlTree,
        index: usize,
        new_items: Vec<Option<Item>>,
    ) -> Result<()> {
        let mut list = self.items(tree).to_vec();
        let index = index.min(list.len());
        list.splice(index..index, new_items.iter().cloned());
        tree.set_value(self.0, &ITEMS, Rc::new(list))?;

        let (position, created) = self.with_generator(tree, |tree, gen| {
            gen.insert_space(index, new_items.len());
            let position = gen.containers_before(index);
            Ok((position, gen.create_containers(tree, index, &new_items)?))
        })?;
        for (offset, container) in created.into_iter().enumerate() {
            tree.add_logical_child(self.0, container)?;
            tree.insert_visual_child(self.0, position + offset, container)?;
        }
        Ok(())
    }

    fn remove_items(self, tree: &mut ControlTree, index: usize, count: usize) -> Result<()> {
        let removed = self.with_generator(tree, |_, gen| gen.remove_containers(index, count))?;
        let mut list = self.items(tree).to_vec();
        let end = (index + count).min(list.len());
        list.drain(index.min(end)..end);
        tree.set_value(self.0, &ITEMS, Rc::new(list))?;
        self.destroy(tree, removed)
    }

    fn regenerate(self, tree: &mut ControlTree) -> Result<()> {
        let old = self.with_generator(tree, |_, gen| Ok(gen.clear()))?;
        self.destroy(tree, old)?;
        let items = self.items(tree);
        let created =
            self.with_generator(tree, |tree, gen| gen.create_containers(tree, 0, &items))?;
        for container in created {
            tree.add_logical_child(self.0, container)?;
            tree.add_visual_child(self.0, container)?;
        }
        Ok(())
    }

    fn destroy(self, tree: &mut ControlTree, containers: Vec<ControlId>) -> Result<()> {
        for container in containers {
            tree.remove_logical_child(self.0, container)?;
            tree.remove(container)?;
        }
        Ok(())
    }

    /// Run `f` with the generator taken out of the tree, then put it back.
    fn with_generator<R>(
        self,
        tree: &mut ControlTree,
        f: impl FnOnce(&mut ControlTree, &mut ItemContainerGenerator) -> Result<R>,
    ) -> Result<R> {
        let mut gen = tree
            .take_extension::<ItemContainerGenerator>(self.0)
            .ok_or(TreeError::InvalidControl(self.0))?;
        let result = f(tree, &mut gen);
        tree.insert_extension(self.0, gen)?;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::items::{items, DATA_CONTEXT};
    use crate::controls::text_block::TEXT;
    use pretty_assertions::assert_eq;

    fn texts(tree: &ControlTree, repeat: Repeat) -> Vec<String> {
        repeat
            .containers(tree)
            .iter()
            .map(|&c| tree.get_value(c, &TEXT))
            .collect()
    }

    #[test]
    fn nulls_get_no_container() {
        let mut tree = ControlTree::new();
        let repeat = Repeat::new(&mut tree).unwrap();
        repeat
            .set_items(&mut tree, items([Some("Foo"), None, Some("Bar")]))
            .unwrap();
        assert_eq!(texts(&tree, repeat), vec!["Foo", "Bar"]);
        assert_eq!(tree.visual_children(repeat.id()).len(), 2);
        assert_eq!(tree.logical_children(repeat.id()).len(), 2);
    }

    #[test]
    fn remove_drops_the_matching_container() {
        let mut tree = ControlTree::new();
        let repeat = Repeat::new(&mut tree).unwrap();
        repeat
            .set_items(&mut tree, items([Some("Foo"), None, Some("Bar")]))
            .unwrap();
        let bar = repeat.container_from_index(&tree, 2).unwrap();
        repeat
            .items_changed(
                &mut tree,
                CollectionChange::Remove {
                    index: 2,
                    items: vec![Some(Item::from("Bar"))],
                },
            )
            .unwrap();
        assert!(!tree.contains(bar));
        assert_eq!(texts(&tree, repeat), vec!["Foo"]);
        assert_eq!(repeat.items(&tree).len(), 2);
    }

    #[test]
    fn add_inserts_in_item_order() {
        let mut tree = ControlTree::new();
        let repeat = Repeat::new(&mut tree).unwrap();
        repeat
            .set_items(&mut tree, items([Some("a"), None, Some("d")]))
            .unwrap();
        repeat
            .items_changed(
                &mut tree,
                CollectionChange::Add {
                    index: 2,
                    items: vec![Some(Item::from("b")), Some(Item::from("c"))],
                },
            )
            .unwrap();
        assert_eq!(texts(&tree, repeat), vec!["a", "b", "c", "d"]);
        assert_eq!(tree.visual_children(repeat.id()), repeat.containers(&tree).as_slice());
        assert_eq!(repeat.index_from_container(&tree, repeat.containers(&tree)[3]), Some(4));
    }

    #[test]
    fn replace_reset_and_move() {
        let mut tree = ControlTree::new();
        let repeat = Repeat::new(&mut tree).unwrap();
        repeat.set_items(&mut tree, items([Some("a"), Some("b")])).unwrap();
        repeat
            .items_changed(
                &mut tree,
                CollectionChange::Replace {
                    index: 0,
                    old_items: vec![Some(Item::from("a"))],
                    new_items: vec![Some(Item::from("z"))],
                },
            )
            .unwrap();
        assert_eq!(texts(&tree, repeat), vec!["z", "b"]);

        let before = repeat.containers(&tree);
        repeat.items_changed(&mut tree, CollectionChange::Reset).unwrap();
        assert_eq!(texts(&tree, repeat), vec!["z", "b"]);
        assert!(before.iter().all(|&c| !tree.contains(c)));

        let err = repeat
            .items_changed(
                &mut tree,
                CollectionChange::Move {
                    old_index: 0,
                    new_index: 1,
                    items: vec![Some(Item::from("z"))],
                },
            )
            .unwrap_err();
        assert_eq!(err, TreeError::UnsupportedCollectionAction(CollectionAction::Move));
    }

    #[test]
    fn custom_item_template() {
        let mut tree = ControlTree::new();
        let repeat = Repeat::new(&mut tree).unwrap();
        repeat.set_items(&mut tree, items([Some("a")])).unwrap();
        repeat
            .set_item_template(
                &mut tree,
                ItemTemplate::new(|tree, _| Ok(tree.insert(Control::new(&types::BORDER)))),
            )
            .unwrap();
        let container = repeat.containers(&tree)[0];
        assert_eq!(tree.control_type(container), Some(&types::BORDER));
        assert_eq!(tree.get_value(container, &DATA_CONTEXT), Some(Item::from("a")));
    }
}
