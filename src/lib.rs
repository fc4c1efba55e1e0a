//! # lookless
//!
//! The core of a retained-mode UI toolkit: a tree of controls with separate
//! visual and logical parent links, name scopes, lookless templates whose
//! presenters hand content back to the templated control, and a style engine
//! whose selectors are re-evaluated live as classes and properties change.
//!
//! ## Core Systems
//!
//! - **[`tree`]**: Slotmap-backed control arena, visual and logical trees, name scopes, lifecycle
//! - **[`property`]**: Typed properties with layered values, inheritance and coercion
//! - **[`reactive`]**: Signals and auto-tracking effects driving change notification
//! - **[`styling`]**: Selector combinators, live activators, the selector parser and the styler
//! - **[`template`]**: Control templates, presenters and template application
//! - **[`controls`]**: Panel, Decorator, ContentControl, Repeat, Pages and the selection behaviors
//! - **[`layout`]**: Measure invalidation and the measure pass that applies pending templates
//! - **[`testing`]**: Tree dumps for snapshot tests
//!
//! ```ignore
//! let mut tree = ControlTree::new();
//! let window = tree.insert(Control::new(&types::WINDOW).root());
//! let text = TextBlock::create(&mut tree, "hello")?;
//! let cc = ContentControl::new(&mut tree);
//! tree.add_logical_child(window, cc.id())?;
//! tree.add_visual_child(window, cc.id())?;
//! cc.set_content(&mut tree, Some(text))?;
//! tree.measure(window)?;
//! ```

// Foundation
pub mod config;
pub mod error;
pub mod logging;
pub mod reactive;

// Core systems
pub mod property;
pub mod tree;

// Styling and templates
pub mod styling;
pub mod template;

// Controls
pub mod controls;
pub mod layout;

// Test support
pub mod testing;

pub use config::TreeConfig;
pub use error::{ParentKind, Result, TreeError};
pub use property::{Property, PropertyChange};
pub use tree::{types, Control, ControlId, ControlTree, NameScope};
