//! Test helpers: text dumps of the visual and logical trees.
//!
//! Use [`tree_to_string`] to capture a tree as indented text for
//! snapshot-style assertions.

pub mod dump;

pub use dump::{tree_to_string, TreeKind};
