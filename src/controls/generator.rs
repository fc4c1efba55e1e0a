//! Item container generation.
//!
//! The generator maps data indices to the containers built for them. A null
//! item still occupies its index (mapped to no container), so index ranges
//! always line up with the data collection.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Result, TreeError};
use crate::logging::targets;
use crate::tree::{ControlId, ControlTree};

use super::items::{Item, DATA_CONTEXT};
use super::text_block::TextBlock;

type BuildFn = dyn Fn(&mut ControlTree, &Item) -> Result<ControlId>;

/// Builds the container control for one data item.
#[derive(Clone)]
pub struct ItemTemplate(Rc<BuildFn>);

impl ItemTemplate {
    pub fn new(build: impl Fn(&mut ControlTree, &Item) -> Result<ControlId> + 'static) -> Self {
        Self(Rc::new(build))
    }

    /// A `TextBlock` showing the item's text.
    pub fn text_block() -> Self {
        Self::new(|tree, item| TextBlock::create(tree, item.text()))
    }

    pub fn build(&self, tree: &mut ControlTree, item: &Item) -> Result<ControlId> {
        (self.0)(tree, item)
    }
}

impl Default for ItemTemplate {
    fn default() -> Self {
        Self::text_block()
    }
}

impl fmt::Debug for ItemTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ItemTemplate")
    }
}

/// Creates and tracks one container per non-null data item.
#[derive(Debug)]
pub struct ItemContainerGenerator {
    owner: ControlId,
    template: ItemTemplate,
    containers: BTreeMap<usize, Option<ControlId>>,
}

impl ItemContainerGenerator {
    pub fn new(owner: ControlId, template: ItemTemplate) -> Self {
        Self {
            owner,
            template,
            containers: BTreeMap::new(),
        }
    }

    pub fn owner(&self) -> ControlId {
        self.owner
    }

    pub fn set_template(&mut self, template: ItemTemplate) {
        self.template = template;
    }

    /// Build containers for `items`, assigning indices from `start_index`.
    ///
    /// Every index in the range is checked before anything is built. Each
    /// container gets its item as `DataContext`. Returns the new containers in
    /// index order; null items add none.
    pub fn create_containers(
        &mut self,
        tree: &mut ControlTree,
        start_index: usize,
        items: &[Option<Item>],
    ) -> Result<Vec<ControlId>> {
        let range = start_index..start_index + items.len();
        if let Some(index) = range.clone().find(|i| self.containers.contains_key(i)) {
            return Err(TreeError::ContainerAlreadyCreated(index));
        }

        // Build everything before touching the index map; a failed build
        // takes the containers already built with it.
        let mut built: Vec<(usize, Option<ControlId>)> = Vec::with_capacity(items.len());
        for (index, item) in range.zip(items) {
            let container = match item {
                Some(item) => match self.build_container(tree, item) {
                    Ok(container) => Some(container),
                    Err(err) => {
                        for container in built.into_iter().filter_map(|(_, c)| c) {
                            tree.remove(container)?;
                        }
                        return Err(err);
                    }
                },
                None => None,
            };
            built.push((index, container));
        }

        let created: Vec<ControlId> = built.iter().filter_map(|(_, c)| *c).collect();
        self.containers.extend(built);
        tracing::trace!(
            target: targets::ITEMS,
            owner = ?self.owner,
            start_index,
            count = items.len(),
            created = created.len(),
            "containers created"
        );
        Ok(created)
    }

    fn build_container(&self, tree: &mut ControlTree, item: &Item) -> Result<ControlId> {
        let container = self.template.build(tree, item)?;
        tree.set_value(container, &DATA_CONTEXT, Some(item.clone()))?;
        Ok(container)
    }

    /// Forget the containers for `count` indices from `start_index` and shift
    /// later indices down.
    ///
    /// Returns the removed containers; the caller takes them out of the tree.
    pub fn remove_containers(
        &mut self,
        start_index: usize,
        count: usize,
    ) -> Result<Vec<ControlId>> {
        let end = start_index + count;
        if let Some(index) = (start_index..end).find(|i| !self.containers.contains_key(i)) {
            return Err(TreeError::ContainerNotCreated(index));
        }

        let mut removed = Vec::new();
        for index in start_index..end {
            if let Some(Some(container)) = self.containers.remove(&index) {
                removed.push(container);
            }
        }
        let tail = self.containers.split_off(&end);
        self.containers
            .extend(tail.into_iter().map(|(i, c)| (i - count, c)));
        tracing::trace!(
            target: targets::ITEMS,
            owner = ?self.owner,
            start_index,
            count,
            removed = removed.len(),
            "containers removed"
        );
        Ok(removed)
    }

    /// Shift every index at or after `index` up by `count`, leaving a gap for
    /// new items.
    pub fn insert_space(&mut self, index: usize, count: usize) {
        let tail = self.containers.split_off(&index);
        self.containers
            .extend(tail.into_iter().map(|(i, c)| (i + count, c)));
    }

    /// Forget every container and return them in index order.
    pub fn clear(&mut self) -> Vec<ControlId> {
        std::mem::take(&mut self.containers)
            .into_values()
            .flatten()
            .collect()
    }

    pub fn container_from_index(&self, index: usize) -> Option<ControlId> {
        self.containers.get(&index).copied().flatten()
    }

    pub fn index_from_container(&self, container: ControlId) -> Option<usize> {
        self.containers
            .iter()
            .find(|(_, c)| **c == Some(container))
            .map(|(i, _)| *i)
    }

    /// Live containers in index order.
    pub fn containers(&self) -> Vec<ControlId> {
        self.containers.values().flatten().copied().collect()
    }

    /// Number of live containers at indices below `index`.
    pub fn containers_before(&self, index: usize) -> usize {
        self.containers
            .range(..index)
            .filter(|(_, c)| c.is_some())
            .count()
    }

    /// Number of indices tracked, null items included.
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}
