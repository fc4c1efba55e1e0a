//! Signals, effects and the thread-local runtime that connects them.
//!
//! Fine-grained reactive primitives: signals store values, effects auto-track
//! the signals they read and re-run when any of them change. Single-threaded,
//! synchronous and re-entrant: a write inside an effect queues the affected
//! effects instead of recursing.
//!
//! Signal and effect slots are slotmap keys so controls can free the state
//! they own when they are removed from a tree.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexSet;
use slotmap::{new_key_type, SlotMap};

// ---------------------------------------------------------------------------
// IDs
// ---------------------------------------------------------------------------

new_key_type! {
    /// Identifies a signal slot inside the runtime.
    pub struct SignalId;

    /// Identifies an effect slot inside the runtime.
    pub struct EffectId;
}

// ---------------------------------------------------------------------------
// Runtime internals
// ---------------------------------------------------------------------------

struct SignalState {
    value: Box<dyn Any>,
    /// In subscription order, so notification order is deterministic.
    subscribers: IndexSet<EffectId>,
}

struct EffectState {
    /// Taken out while the effect runs so the runtime is not borrowed across
    /// the user callback.
    callback: Option<Box<dyn FnMut()>>,
    dependencies: IndexSet<SignalId>,
}

struct Runtime {
    signals: SlotMap<SignalId, SignalState>,
    effects: SlotMap<EffectId, EffectState>,
    /// The effect currently executing (for auto-tracking).
    tracking: Option<EffectId>,
    /// When > 0 we are inside a `batch()` call and effects are deferred.
    batch_depth: usize,
    /// Effects that need to be re-run once the outermost batch or the
    /// running notification pass ends.
    pending_effects: Vec<EffectId>,
    running_effects: bool,
}

impl Runtime {
    fn new() -> Self {
        Self {
            signals: SlotMap::with_key(),
            effects: SlotMap::with_key(),
            tracking: None,
            batch_depth: 0,
            pending_effects: Vec::new(),
            running_effects: false,
        }
    }
}

thread_local! {
    static RUNTIME: RefCell<Runtime> = RefCell::new(Runtime::new());
}

// ---------------------------------------------------------------------------
// Signal creation
// ---------------------------------------------------------------------------

/// Create a reactive signal with the given initial value.
///
/// Returns a `(ReadSignal<T>, WriteSignal<T>)` pair. Reading inside an effect
/// automatically subscribes that effect to changes.
pub fn create_signal<T: 'static>(initial: T) -> (ReadSignal<T>, WriteSignal<T>) {
    let id = RUNTIME.with(|rt| {
        rt.borrow_mut().signals.insert(SignalState {
            value: Box::new(initial),
            subscribers: IndexSet::new(),
        })
    });

    (
        ReadSignal {
            id,
            _marker: PhantomData,
        },
        WriteSignal {
            id,
            _marker: PhantomData,
        },
    )
}

/// Free a signal slot. Reads of a disposed signal through [`ReadSignal::try_with`]
/// return `None`; effects that depended on it simply stop hearing from it.
pub fn dispose_signal(id: SignalId) {
    let removed = RUNTIME.with(|rt| {
        let mut rt_ref = rt.borrow_mut();
        let state = rt_ref.signals.remove(id)?;
        for eid in &state.subscribers {
            if let Some(effect) = rt_ref.effects.get_mut(*eid) {
                effect.dependencies.shift_remove(&id);
            }
        }
        Some(state)
    });
    // Dropped outside the borrow: the value may own handles whose drop
    // touches the runtime again.
    drop(removed);
}

/// Whether a signal slot is still alive.
pub fn signal_exists(id: SignalId) -> bool {
    RUNTIME.with(|rt| rt.borrow().signals.contains_key(id))
}

// ---------------------------------------------------------------------------
// ReadSignal
// ---------------------------------------------------------------------------

/// Read-half of a signal. `Copy`, only stores an id.
pub struct ReadSignal<T: 'static> {
    id: SignalId,
    _marker: PhantomData<T>,
}

impl<T: 'static> Copy for ReadSignal<T> {}
impl<T: 'static> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> fmt::Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadSignal").field("id", &self.id).finish()
    }
}

impl<T: 'static> ReadSignal<T> {
    /// The runtime slot backing this signal.
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// Read the current value, subscribing the running effect (if any).
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(|v| v.clone())
    }

    /// Read by reference without cloning. Still subscribes the running effect.
    ///
    /// # Panics
    ///
    /// Panics if the signal was disposed.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.try_with(f).expect("signal was disposed")
    }

    /// Like [`with`](Self::with), returning `None` when the signal was disposed.
    pub fn try_with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        RUNTIME.with(|rt| {
            {
                let mut rt_ref = rt.borrow_mut();
                if let Some(eid) = rt_ref.tracking {
                    let signal = rt_ref.signals.get_mut(self.id)?;
                    signal.subscribers.insert(eid);
                    if let Some(effect) = rt_ref.effects.get_mut(eid) {
                        effect.dependencies.insert(self.id);
                    }
                }
            }
            let rt_ref = rt.borrow();
            let value = &rt_ref.signals.get(self.id)?.value;
            Some(f(value.downcast_ref::<T>().expect("signal type mismatch")))
        })
    }

    /// Read without tracking; will not subscribe any running effect.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.with_untracked(|v| v.clone())
            .expect("signal was disposed")
    }

    /// Read by reference without tracking. `None` when the signal was disposed.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        RUNTIME.with(|rt| {
            let rt_ref = rt.borrow();
            let value = &rt_ref.signals.get(self.id)?.value;
            Some(f(value.downcast_ref::<T>().expect("signal type mismatch")))
        })
    }
}

// ---------------------------------------------------------------------------
// WriteSignal
// ---------------------------------------------------------------------------

/// Write-half of a signal. `Copy`, only stores an id.
pub struct WriteSignal<T: 'static> {
    id: SignalId,
    _marker: PhantomData<T>,
}

impl<T: 'static> Copy for WriteSignal<T> {}
impl<T: 'static> Clone for WriteSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> fmt::Debug for WriteSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteSignal").field("id", &self.id).finish()
    }
}

impl<T: 'static> WriteSignal<T> {
    /// Overwrite the signal value and notify subscribers.
    ///
    /// Writing to a disposed signal is a no-op.
    pub fn set(&self, value: T) {
        self.update(move |slot| *slot = value);
    }

    /// Mutate the value in-place and notify subscribers.
    ///
    /// `f` must not read or write other signals.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let subs = RUNTIME.with(|rt| {
            let mut rt_ref = rt.borrow_mut();
            let signal = rt_ref.signals.get_mut(self.id)?;
            let val = signal
                .value
                .downcast_mut::<T>()
                .expect("signal type mismatch");
            f(val);
            Some(signal.subscribers.iter().copied().collect::<Vec<_>>())
        });
        if let Some(subs) = subs {
            notify_subscribers(subs);
        }
    }
}

// ---------------------------------------------------------------------------
// RwSignal
// ---------------------------------------------------------------------------

/// Both halves of a signal in one `Copy` handle.
pub struct RwSignal<T: 'static> {
    read: ReadSignal<T>,
    write: WriteSignal<T>,
}

impl<T: 'static> Copy for RwSignal<T> {}
impl<T: 'static> Clone for RwSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> fmt::Debug for RwSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RwSignal").field("id", &self.read.id).finish()
    }
}

impl<T: 'static> RwSignal<T> {
    pub fn new(initial: T) -> Self {
        let (read, write) = create_signal(initial);
        Self { read, write }
    }

    pub fn read_only(&self) -> ReadSignal<T> {
        self.read
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.read.get()
    }

    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.read.get_untracked()
    }

    pub fn try_with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.read.try_with(f)
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.read.with_untracked(f)
    }

    pub fn set(&self, value: T) {
        self.write.set(value);
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.write.update(f);
    }

    /// Free the underlying slot.
    pub fn dispose(&self) {
        dispose_signal(self.read.id);
    }

    pub fn is_disposed(&self) -> bool {
        !signal_exists(self.read.id)
    }
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// Create a side-effect that auto-tracks signal reads.
///
/// The closure runs immediately once (establishing initial subscriptions),
/// then re-runs whenever any tracked signal changes.
pub fn create_effect(f: impl FnMut() + 'static) {
    create_effect_with_id(f);
}

/// Create an effect and return its [`EffectId`] so it can later be disposed.
pub fn create_effect_with_id(f: impl FnMut() + 'static) -> EffectId {
    let eid = RUNTIME.with(|rt| {
        rt.borrow_mut().effects.insert(EffectState {
            callback: Some(Box::new(f)),
            dependencies: IndexSet::new(),
        })
    });
    run_effect(eid);
    eid
}

/// Remove an effect so it no longer re-runs when its dependencies change.
///
/// Safe to call from inside the effect itself.
pub fn dispose_effect(eid: EffectId) {
    let removed = RUNTIME.with(|rt| {
        let mut rt_ref = rt.borrow_mut();
        let state = rt_ref.effects.remove(eid)?;
        for sid in &state.dependencies {
            if let Some(signal) = rt_ref.signals.get_mut(*sid) {
                signal.subscribers.shift_remove(&eid);
            }
        }
        Some(state)
    });
    drop(removed);
}

/// Whether an effect is still registered.
pub fn effect_exists(eid: EffectId) -> bool {
    RUNTIME.with(|rt| rt.borrow().effects.contains_key(eid))
}

/// Run `f` with dependency tracking switched off.
///
/// Signals read inside `f` do not subscribe the currently running effect.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    let prev = RUNTIME.with(|rt| rt.borrow_mut().tracking.take());
    let result = f();
    RUNTIME.with(|rt| rt.borrow_mut().tracking = prev);
    result
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Batch multiple signal writes so that effects run only once.
///
/// ```ignore
/// batch(|| {
///     set_a.set(1);
///     set_b.set(2);
/// });
/// // Effects that depend on a and/or b run once here.
/// ```
pub fn batch(f: impl FnOnce()) {
    RUNTIME.with(|rt| {
        rt.borrow_mut().batch_depth += 1;
    });

    f();

    let pending = RUNTIME.with(|rt| {
        let mut rt_ref = rt.borrow_mut();
        rt_ref.batch_depth -= 1;
        if rt_ref.batch_depth == 0 {
            let mut seen = HashSet::new();
            rt_ref
                .pending_effects
                .drain(..)
                .filter(|id| seen.insert(*id))
                .collect()
        } else {
            Vec::new()
        }
    });

    notify_subscribers(pending);
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Run a single effect: clear old deps, set tracking, execute callback.
fn run_effect(eid: EffectId) {
    let maybe_cb = RUNTIME.with(|rt| {
        let mut rt_ref = rt.borrow_mut();
        let old_deps: Vec<SignalId> = rt_ref.effects.get_mut(eid)?.dependencies.drain(..).collect();
        for sid in old_deps {
            if let Some(signal) = rt_ref.signals.get_mut(sid) {
                signal.subscribers.shift_remove(&eid);
            }
        }
        rt_ref.effects.get_mut(eid)?.callback.take()
    });

    let Some(mut cb) = maybe_cb else {
        return;
    };

    let prev_tracking = RUNTIME.with(|rt| {
        let mut rt_ref = rt.borrow_mut();
        rt_ref.tracking.replace(eid)
    });

    cb();

    let orphaned = RUNTIME.with(|rt| {
        let mut rt_ref = rt.borrow_mut();
        rt_ref.tracking = prev_tracking;
        match rt_ref.effects.get_mut(eid) {
            Some(state) => {
                state.callback = Some(cb);
                None
            }
            // Disposed while running.
            None => Some(cb),
        }
    });
    drop(orphaned);
}

/// Notify a list of subscriber effects that a signal changed.
fn notify_subscribers(subs: Vec<EffectId>) {
    if subs.is_empty() {
        return;
    }

    let queued = RUNTIME.with(|rt| {
        let mut rt_ref = rt.borrow_mut();
        if rt_ref.batch_depth > 0 || rt_ref.running_effects {
            rt_ref.pending_effects.extend(subs.iter().copied());
            true
        } else {
            rt_ref.running_effects = true;
            false
        }
    });
    if queued {
        return;
    }

    let mut queue: Vec<EffectId> = subs;
    while !queue.is_empty() {
        let mut seen = HashSet::new();
        for eid in std::mem::take(&mut queue) {
            if seen.insert(eid) && effect_exists(eid) {
                run_effect(eid);
            }
        }
        RUNTIME.with(|rt| {
            let mut rt_ref = rt.borrow_mut();
            queue.append(&mut rt_ref.pending_effects);
        });
    }

    RUNTIME.with(|rt| {
        rt.borrow_mut().running_effects = false;
    });
}

#[cfg(test)]
pub(crate) fn live_signal_count() -> usize {
    RUNTIME.with(|rt| rt.borrow().signals.len())
}

#[cfg(test)]
pub(crate) fn live_effect_count() -> usize {
    RUNTIME.with(|rt| rt.borrow().effects.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn update_in_place() {
        let (r, w) = create_signal(vec![1, 2]);
        w.update(|v| v.push(3));
        assert_eq!(r.get(), vec![1, 2, 3]);
    }

    #[test]
    fn get_untracked_does_not_subscribe() {
        let (r, w) = create_signal(0);
        let count = Rc::new(Cell::new(0));
        let count_c = count.clone();
        create_effect(move || {
            let _ = r.get_untracked();
            count_c.set(count_c.get() + 1);
        });
        assert_eq!(count.get(), 1);
        w.set(1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn effect_tracks_single_signal() {
        let (r, w) = create_signal(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_c = log.clone();
        create_effect(move || {
            log_c.borrow_mut().push(r.get());
        });
        assert_eq!(*log.borrow(), vec![0]);
        w.set(1);
        w.set(2);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn effect_retracks_on_conditional_read() {
        let (flag, set_flag) = create_signal(true);
        let (a, set_a) = create_signal(1);
        let (b, set_b) = create_signal(2);
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_c = log.clone();

        create_effect(move || {
            let val = if flag.get() { a.get() } else { b.get() };
            log_c.borrow_mut().push(val);
        });
        set_flag.set(false);
        assert_eq!(*log.borrow(), vec![1, 2]);

        // `a` is no longer a dependency.
        set_a.set(50);
        assert_eq!(*log.borrow(), vec![1, 2]);

        set_b.set(99);
        assert_eq!(*log.borrow(), vec![1, 2, 99]);
    }

    #[test]
    fn batch_defers_effects() {
        let (a_r, a_w) = create_signal(0);
        let (b_r, b_w) = create_signal(0);
        let count = Rc::new(Cell::new(0));
        let count_c = count.clone();
        create_effect(move || {
            let _ = a_r.get() + b_r.get();
            count_c.set(count_c.get() + 1);
        });

        batch(|| {
            a_w.set(1);
            b_w.set(2);
        });
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn dispose_effect_stops_reruns_and_frees_slot() {
        let before = live_effect_count();
        let (r, w) = create_signal(0);
        let count = Rc::new(Cell::new(0));
        let count_c = count.clone();
        let eid = create_effect_with_id(move || {
            let _ = r.get();
            count_c.set(count_c.get() + 1);
        });
        dispose_effect(eid);
        w.set(5);
        assert_eq!(count.get(), 1);
        assert_eq!(live_effect_count(), before);
    }

    #[test]
    fn disposed_signal_reads_none() {
        let sig = RwSignal::new(3);
        sig.dispose();
        assert!(sig.is_disposed());
        assert_eq!(sig.try_with(|v| *v), None);
        // Writes are ignored.
        sig.set(4);
    }

    #[test]
    fn dispose_signal_frees_slot() {
        let before = live_signal_count();
        let sig = RwSignal::new(String::from("x"));
        assert_eq!(live_signal_count(), before + 1);
        sig.dispose();
        assert_eq!(live_signal_count(), before);
    }

    #[test]
    fn write_inside_effect_is_queued_not_recursive() {
        let (src, set_src) = create_signal(0);
        let (dst, set_dst) = create_signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_c = seen.clone();
        create_effect(move || {
            seen_c.borrow_mut().push(dst.get());
        });
        create_effect(move || {
            let v = src.get();
            set_dst.set(v * 10);
        });
        set_src.set(2);
        assert_eq!(*seen.borrow(), vec![0, 0, 20]);
    }

    #[test]
    fn untrack_hides_reads() {
        let (r, w) = create_signal(1);
        let count = Rc::new(Cell::new(0));
        let count_c = count.clone();
        create_effect(move || {
            untrack(|| r.get());
            count_c.set(count_c.get() + 1);
        });
        w.set(2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn effect_can_dispose_itself() {
        let (r, w) = create_signal(0);
        let id_cell: Rc<Cell<Option<EffectId>>> = Rc::new(Cell::new(None));
        let id_c = id_cell.clone();
        let runs = Rc::new(Cell::new(0));
        let runs_c = runs.clone();
        let eid = create_effect_with_id(move || {
            let v = r.get();
            runs_c.set(runs_c.get() + 1);
            if v > 0 {
                if let Some(id) = id_c.get() {
                    dispose_effect(id);
                }
            }
        });
        id_cell.set(Some(eid));
        w.set(1);
        w.set(2);
        assert_eq!(runs.get(), 2);
        assert!(!effect_exists(eid));
    }
}
