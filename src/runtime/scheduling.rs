//! Deferred, batched effect execution.
//!
//! Writes never run effects synchronously: they add the dependents to a
//! pending set, and the set is drained by `tick()` — the stand-in for the
//! microtask boundary an event-loop host would provide. Effects scheduled
//! many times within one turn flush exactly once.

use std::rc::Rc;

use super::context::with_context;
use super::effect::EffectInner;

/// Add an effect to the pending set. Set semantics: an effect already
/// pending is not added again.
pub(crate) fn schedule(effect: Rc<EffectInner>) {
    with_context(|ctx| {
        let mut queue = ctx.queue.borrow_mut();
        if !queue.iter().any(|e| Rc::ptr_eq(e, &effect)) {
            queue.push(effect);
        }
    });
}

/// Drain one pending set in a single pass. Effects whose dependency set
/// emptied since they were scheduled (disposed or self-unsubscribed) are
/// skipped. Effects scheduled during the pass land in a fresh set for the
/// next pass.
fn flush_pass() -> bool {
    let pending = with_context(|ctx| ctx.queue.replace(Vec::new()));
    if pending.is_empty() {
        return false;
    }
    for effect in pending {
        if effect.dep_count() > 0 {
            effect.run();
        }
    }
    true
}

/// Run flush passes until the pending set is empty. Each pass is a fresh
/// deferred flush; a chain (signal -> computed invalidation -> dependent
/// effect) settles across consecutive passes within one tick. An effect
/// that perpetually reschedules itself never settles — runaway user code
/// is not contained.
pub fn tick() {
    while flush_pass() {}
}

/// Run `f` with flushing suppressed until the outermost batch exits, so
/// multiple synchronous mutations coalesce into one re-run per affected
/// effect even without the host driving `tick`.
pub fn batch<T>(f: impl FnOnce() -> T) -> T {
    with_context(|ctx| ctx.batch_depth.set(ctx.batch_depth.get() + 1));

    struct BatchGuard;
    impl Drop for BatchGuard {
        fn drop(&mut self) {
            let depth = with_context(|ctx| {
                let depth = ctx.batch_depth.get().saturating_sub(1);
                ctx.batch_depth.set(depth);
                depth
            });
            if depth == 0 {
                tick();
            }
        }
    }

    let _guard = BatchGuard;
    f()
}

/// Read reactive values inside `f` without registering the current effect
/// as a dependent.
pub fn untrack<T>(f: impl FnOnce() -> T) -> T {
    let prev = with_context(|ctx| ctx.untracking.replace(true));

    struct UntrackGuard {
        prev: bool,
    }
    impl Drop for UntrackGuard {
        fn drop(&mut self) {
            with_context(|ctx| ctx.untracking.set(self.prev));
        }
    }

    let _guard = UntrackGuard { prev };
    f()
}
