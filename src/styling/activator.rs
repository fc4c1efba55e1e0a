//! Selector match results and the live activators behind them.

use std::fmt;
use std::rc::Rc;

use crate::reactive::{untrack, Subscription};

// ---------------------------------------------------------------------------
// Activator
// ---------------------------------------------------------------------------

/// A boolean that changes over time.
///
/// The evaluation closure reads signals (class sets, property slots); a
/// subscription re-runs it whenever any of them change.
#[derive(Clone)]
pub struct Activator {
    eval: Rc<dyn Fn() -> bool>,
}

impl fmt::Debug for Activator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activator")
            .field("current", &self.current())
            .finish()
    }
}

impl Activator {
    pub fn new(eval: impl Fn() -> bool + 'static) -> Self {
        Self {
            eval: Rc::new(eval),
        }
    }

    /// Current value, without subscribing anything.
    pub fn current(&self) -> bool {
        untrack(|| (self.eval)())
    }

    /// Call `f` with the current value now, then again each time it flips.
    ///
    /// `f` runs untracked, so it may freely read and write other signals.
    pub fn subscribe(&self, mut f: impl FnMut(bool) + 'static) -> Subscription {
        let eval = self.eval.clone();
        let mut last: Option<bool> = None;
        Subscription::new(move || {
            let value = eval();
            if last != Some(value) {
                last = Some(value);
                untrack(|| f(value));
            }
        })
    }

    /// True while any input is true.
    pub fn any(inputs: Vec<Activator>) -> Self {
        Self::new(move || inputs.iter().any(|a| (a.eval)()))
    }

    /// True while every input is true.
    pub fn all(inputs: Vec<Activator>) -> Self {
        Self::new(move || inputs.iter().all(|a| (a.eval)()))
    }
}

// ---------------------------------------------------------------------------
// SelectorMatch
// ---------------------------------------------------------------------------

/// Result of matching a selector against a control.
#[derive(Clone, Debug)]
pub enum SelectorMatch {
    /// Known now and never changes.
    Immediate(bool),
    /// Depends on mutable state.
    Live(Activator),
}

impl SelectorMatch {
    pub const TRUE: SelectorMatch = SelectorMatch::Immediate(true);
    pub const FALSE: SelectorMatch = SelectorMatch::Immediate(false);

    pub fn is_immediate_true(&self) -> bool {
        matches!(self, Self::Immediate(true))
    }

    pub fn is_immediate_false(&self) -> bool {
        matches!(self, Self::Immediate(false))
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    /// Current value, whether immediate or live.
    pub fn current(&self) -> bool {
        match self {
            Self::Immediate(v) => *v,
            Self::Live(a) => a.current(),
        }
    }

    /// OR. An immediate `true` wins outright; immediate `false`s are dropped.
    pub fn any(matches: impl IntoIterator<Item = SelectorMatch>) -> SelectorMatch {
        let mut live = Vec::new();
        for m in matches {
            match m {
                Self::Immediate(true) => return Self::TRUE,
                Self::Immediate(false) => {}
                Self::Live(a) => live.push(a),
            }
        }
        match live.len() {
            0 => Self::FALSE,
            1 => Self::Live(live.remove(0)),
            _ => Self::Live(Activator::any(live)),
        }
    }

    /// AND. An immediate `false` wins outright; immediate `true`s are dropped.
    pub fn all(matches: impl IntoIterator<Item = SelectorMatch>) -> SelectorMatch {
        let mut live = Vec::new();
        for m in matches {
            match m {
                Self::Immediate(false) => return Self::FALSE,
                Self::Immediate(true) => {}
                Self::Live(a) => live.push(a),
            }
        }
        match live.len() {
            0 => Self::TRUE,
            1 => Self::Live(live.remove(0)),
            _ => Self::Live(Activator::all(live)),
        }
    }
}
