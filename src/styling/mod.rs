//! Selectors, styles and the styler.
//!
//! Selectors are built in code through [`Selectors`] or parsed from text with
//! [`parse_selector`]. Matching yields a [`SelectorMatch`]: either a fixed
//! answer or an [`Activator`] that flips as classes and properties change.

pub mod activator;
pub mod parser;
pub mod selector;
pub mod style;
pub mod tokenizer;

pub use activator::{Activator, SelectorMatch};
pub use parser::{parse_selector, ParseError, TypeRegistry};
pub use selector::{Selectors, StyleSelector};
pub use style::{Setter, Style, Styles};
