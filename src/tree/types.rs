//! Static control type descriptors used for style keys and property ownership.

use std::fmt;

/// Describes a kind of control. Instances are `static`; identity is by address.
///
/// `base` forms a single-inheritance chain that [`is_a`](Self::is_a) walks, which
/// is what the `:is(...)` selector step matches against.
pub struct ControlType {
    name: &'static str,
    base: Option<&'static ControlType>,
}

impl ControlType {
    /// A root type with no base.
    pub const fn new(name: &'static str) -> Self {
        Self { name, base: None }
    }

    /// A type deriving from `base`.
    pub const fn derived(name: &'static str, base: &'static ControlType) -> Self {
        Self {
            name,
            base: Some(base),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base(&self) -> Option<&'static ControlType> {
        self.base
    }

    /// Whether `self` is `other` or derives from it.
    pub fn is_a(&self, other: &ControlType) -> bool {
        if self == other {
            return true;
        }
        let mut current = self.base;
        while let Some(ty) = current {
            if ty == other {
                return true;
            }
            current = ty.base;
        }
        false
    }
}

impl PartialEq for ControlType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for ControlType {}

impl fmt::Debug for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ---------------------------------------------------------------------------
// Built-in types
// ---------------------------------------------------------------------------

pub static CONTROL: ControlType = ControlType::new("Control");
pub static PANEL: ControlType = ControlType::derived("Panel", &CONTROL);
pub static STACK_PANEL: ControlType = ControlType::derived("StackPanel", &PANEL);
pub static DECORATOR: ControlType = ControlType::derived("Decorator", &CONTROL);
pub static BORDER: ControlType = ControlType::derived("Border", &DECORATOR);
pub static CONTENT_PRESENTER: ControlType = ControlType::derived("ContentPresenter", &DECORATOR);
pub static TEXT_BLOCK: ControlType = ControlType::derived("TextBlock", &CONTROL);
pub static TEMPLATED_CONTROL: ControlType = ControlType::derived("TemplatedControl", &CONTROL);
pub static CONTENT_CONTROL: ControlType =
    ControlType::derived("ContentControl", &TEMPLATED_CONTROL);
pub static WINDOW: ControlType = ControlType::derived("Window", &CONTENT_CONTROL);
pub static USER_CONTROL: ControlType = ControlType::derived("UserControl", &CONTENT_CONTROL);
pub static REPEAT: ControlType = ControlType::derived("Repeat", &CONTROL);
pub static PAGES: ControlType = ControlType::derived("Pages", &PANEL);

/// Every built-in type, in declaration order.
pub static BUILTIN: &[&ControlType] = &[
    &CONTROL,
    &PANEL,
    &STACK_PANEL,
    &DECORATOR,
    &BORDER,
    &CONTENT_PRESENTER,
    &TEXT_BLOCK,
    &TEMPLATED_CONTROL,
    &CONTENT_CONTROL,
    &WINDOW,
    &USER_CONTROL,
    &REPEAT,
    &PAGES,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_a_walks_base_chain() {
        assert!(WINDOW.is_a(&WINDOW));
        assert!(WINDOW.is_a(&CONTENT_CONTROL));
        assert!(WINDOW.is_a(&CONTROL));
        assert!(!CONTENT_CONTROL.is_a(&WINDOW));
        assert!(!BORDER.is_a(&PANEL));
    }

    #[test]
    fn identity_is_by_address() {
        static OTHER_BORDER: ControlType = ControlType::derived("Border", &DECORATOR);
        assert_ne!(&OTHER_BORDER, &BORDER);
        assert_eq!(OTHER_BORDER.name(), BORDER.name());
    }
}
