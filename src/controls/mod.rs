//! Controls built on the tree: panels, decorators, content and items hosts,
//! and the selection behaviors they share.

pub mod collection;
pub mod content;
pub mod decorator;
pub mod generator;
pub mod items;
pub mod pages;
pub mod panel;
pub mod repeat;
pub mod selection;
pub mod text_block;

pub use collection::{CollectionAction, CollectionChange};
pub use content::{ContentControl, CONTENT, PART_CONTENT_PRESENTER};
pub use decorator::{Border, ContentHost, Decorator};
pub use generator::{ItemContainerGenerator, ItemTemplate};
pub use items::{items, Item, ItemData, Items, DATA_CONTEXT, ITEMS};
pub use pages::Pages;
pub use panel::Panel;
pub use repeat::Repeat;
pub use selection::{
    SelectableMixin, SelectionMixin, IS_SELECTED, SELECTED_CLASS, SELECTED_INDEX, SELECTED_ITEM,
};
pub use text_block::{TextBlock, TEXT};
