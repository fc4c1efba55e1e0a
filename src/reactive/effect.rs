//! Auto-tracking side effects and owned subscriptions.
//!
//! An effect is a closure that re-runs whenever any signal it reads changes:
//!
//! ```ignore
//! let (count, set_count) = create_signal(0);
//! create_effect(move || {
//!     println!("count = {}", count.get());
//! });
//! set_count.set(1); // prints "count = 1"
//! ```
//!
//! Controls hold their effects as [`Subscription`]s, which dispose the effect
//! when dropped. Removing a control from a tree drops its subscriptions.

pub use super::signal::{
    batch, create_effect, create_effect_with_id, dispose_effect, effect_exists, untrack, EffectId,
};

/// Owned handle to a running effect. Dropping it disposes the effect.
#[must_use = "dropping a Subscription immediately disposes its effect"]
#[derive(Debug)]
pub struct Subscription {
    effect: Option<EffectId>,
}

impl Subscription {
    /// Start an effect and take ownership of it. The closure runs once now.
    pub fn new(f: impl FnMut() + 'static) -> Self {
        Self {
            effect: Some(create_effect_with_id(f)),
        }
    }

    pub fn effect_id(&self) -> Option<EffectId> {
        self.effect
    }

    pub fn is_active(&self) -> bool {
        self.effect.is_some_and(effect_exists)
    }

    /// Dispose now instead of on drop.
    pub fn cancel(&mut self) {
        if let Some(eid) = self.effect.take() {
            dispose_effect(eid);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
