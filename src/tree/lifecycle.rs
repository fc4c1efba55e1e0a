//! Visual tree lifecycle: attach, detach, template application.
//!
//! The `LifecycleTracker` records which controls are currently attached to a
//! visual root and accumulates lifecycle events that can be drained by the
//! host, for example to run `OnAttachedToVisualTree` style handlers.

use std::collections::HashSet;

use super::control::ControlId;

// ---------------------------------------------------------------------------
// LifecycleEvent
// ---------------------------------------------------------------------------

/// Events that occur during a control's life in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The control became reachable from a visual root.
    AttachedToVisualTree { control: ControlId },
    /// The control stopped being reachable from a visual root.
    DetachedFromVisualTree { control: ControlId },
    /// The control's template was built and applied.
    TemplateApplied { control: ControlId },
}

// ---------------------------------------------------------------------------
// LifecycleTracker
// ---------------------------------------------------------------------------

/// Tracks attached controls and accumulates lifecycle events.
///
/// Attach and detach are each recorded exactly once per transition: a second
/// attach of an attached control (or detach of a detached one) is ignored.
#[derive(Debug)]
pub struct LifecycleTracker {
    attached: HashSet<ControlId>,
    pending: Vec<LifecycleEvent>,
    recording: bool,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self {
            attached: HashSet::new(),
            pending: Vec::new(),
            recording: true,
        }
    }

    /// A tracker that keeps the attached set but queues no events.
    pub fn silent() -> Self {
        Self {
            recording: false,
            ..Self::new()
        }
    }

    pub fn on_attach(&mut self, id: ControlId) {
        if self.attached.insert(id) && self.recording {
            self.pending
                .push(LifecycleEvent::AttachedToVisualTree { control: id });
        }
    }

    pub fn on_detach(&mut self, id: ControlId) {
        if self.attached.remove(&id) && self.recording {
            self.pending
                .push(LifecycleEvent::DetachedFromVisualTree { control: id });
        }
    }

    pub fn on_template_applied(&mut self, id: ControlId) {
        if self.recording {
            self.pending.push(LifecycleEvent::TemplateApplied { control: id });
        }
    }

    pub fn is_attached(&self, id: ControlId) -> bool {
        self.attached.contains(&id)
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Drain and return all pending events, oldest first.
    pub fn pending_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Forget a destroyed control without emitting an event.
    pub(crate) fn forget(&mut self, id: ControlId) {
        self.attached.remove(&id);
    }
}

impl Default for LifecycleTracker {
    fn default() -> Self {
        Self::new()
    }
}
