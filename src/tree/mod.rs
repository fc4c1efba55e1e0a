//! The control tree: an arena of controls with a visual and a logical parent
//! link each, name scopes and lifecycle tracking.

pub mod classes;
pub mod control;
pub mod control_tree;
pub mod lifecycle;
pub mod name_scope;
pub mod query;
pub mod types;

pub use classes::Classes;
pub use control::{Control, ControlId, TemplateAppliedHook};
pub use control_tree::ControlTree;
pub use lifecycle::{LifecycleEvent, LifecycleTracker};
pub use name_scope::{NameDictionary, NameScope};
pub use types::ControlType;
