//! A leaf control showing a string.

use crate::error::Result;
use crate::property::Property;
use crate::tree::{types, Control, ControlId, ControlTree};

pub static TEXT: Property<String> = Property::new(&types::TEXT_BLOCK, "Text", String::new);

pub struct TextBlock;

impl TextBlock {
    pub fn create(tree: &mut ControlTree, text: impl Into<String>) -> Result<ControlId> {
        let id = tree.insert(Control::new(&types::TEXT_BLOCK));
        tree.set_value(id, &TEXT, text.into())?;
        Ok(id)
    }
}
