//! Tree configuration.

use crate::styling::{Style, Styles};

/// Configuration for a [`ControlTree`](crate::tree::ControlTree).
///
/// The style set is injected here and applied to every control as it attaches
/// to a visual root.
#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// Styles applied on attach. Later styles win ties.
    pub styles: Styles,
    /// Apply the templates of nested lookless controls while applying the
    /// outer template, instead of waiting for the next measure pass.
    pub eager_nested_templates: bool,
    /// Queue attach, detach and template events on the lifecycle tracker.
    pub record_lifecycle: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            styles: Styles::new(),
            eager_nested_templates: true,
            record_lifecycle: true,
        }
    }
}

impl TreeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the style set (builder).
    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }

    /// Append one style (builder).
    pub fn with_style(mut self, style: Style) -> Self {
        self.styles.push(style);
        self
    }

    pub fn with_eager_nested_templates(mut self, eager: bool) -> Self {
        self.eager_nested_templates = eager;
        self
    }

    pub fn with_record_lifecycle(mut self, record: bool) -> Self {
        self.record_lifecycle = record;
        self
    }
}
