//! Tracing targets.
//!
//! The crate logs through `tracing` and never installs a subscriber. Filter
//! per subsystem with these targets, for example
//! `RUST_LOG=lookless::styling=trace`.

/// Target names for log filtering.
pub mod targets {
    /// Visual and logical attach, detach and removal.
    pub const TREE: &str = "lookless::tree";
    /// Name scope registration.
    pub const NAMES: &str = "lookless::names";
    /// Template application.
    pub const TEMPLATE: &str = "lookless::template";
    /// Style matching and activation.
    pub const STYLING: &str = "lookless::styling";
    /// Item container generation and selection.
    pub const ITEMS: &str = "lookless::items";
}
