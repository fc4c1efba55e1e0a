//! Reactive state: signals, effects, subscriptions.
//!
//! Fine-grained reactivity that drives property change notification and the
//! live re-evaluation of style selectors.
//!
//! - [`create_signal`] / [`RwSignal`] create a signal.
//! - [`create_effect`] creates an auto-tracking side effect.
//! - [`Subscription`] owns an effect and disposes it on drop.
//! - [`batch`] coalesces multiple writes into one notification pass.

pub mod effect;
pub mod signal;

pub use effect::{
    batch, create_effect, create_effect_with_id, dispose_effect, effect_exists, untrack, EffectId,
    Subscription,
};
pub use signal::{create_signal, dispose_signal, ReadSignal, RwSignal, SignalId, WriteSignal};
