//! Error types for tree, name scope and item generator misuse.
//!
//! Every variant is a contract violation raised at the point of misuse and
//! propagated to the caller with `?`. Nothing in the crate recovers from them.

use crate::controls::collection::CollectionAction;
use crate::tree::ControlId;

/// Errors raised by [`ControlTree`](crate::tree::ControlTree) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("control {control:?} already has a different {kind} parent")]
    AlreadyParented {
        control: ControlId,
        kind: ParentKind,
    },
    #[error("cannot rename {control:?}: it is already attached to a visual tree")]
    ControlAlreadyAttached { control: ControlId },
    #[error("the name '{0}' is already registered in this scope")]
    DuplicateName(String),
    #[error("the name '{0}' is not registered in this scope")]
    NameNotFound(String),
    #[error("no control named '{0}' in this scope")]
    KeyNotFound(String),
    #[error("a container was already created for item index {0}")]
    ContainerAlreadyCreated(usize),
    #[error("no container was created for item index {0}")]
    ContainerNotCreated(usize),
    #[error("cannot reparent the logical children of {0:?}: they were already materialized")]
    ReparentingTooLate(ControlId),
    #[error("collection action '{0}' is not supported here")]
    UnsupportedCollectionAction(CollectionAction),
    #[error("control {0:?} does not exist in this tree")]
    InvalidControl(ControlId),
}

/// Which of the two parent links an [`TreeError::AlreadyParented`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    Visual,
    Logical,
}

impl std::fmt::Display for ParentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Visual => f.write_str("visual"),
            Self::Logical => f.write_str("logical"),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TreeError>;
