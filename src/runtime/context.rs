//! Thread-local reactive context.
//!
//! The single "active effect" pointer, the pending flush queue and the
//! batch depth all live here rather than in true global state, so two
//! independent runtimes in one process stay isolated per thread.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::effect::EffectInner;

pub(crate) struct ReactiveContext {
    /// Effect currently collecting dependencies. At most one at any instant.
    pub active_effect: RefCell<Option<Rc<EffectInner>>>,

    /// Whether reads are currently exempt from tracking.
    pub untracking: Cell<bool>,

    /// Effects pending re-execution, deduplicated by identity.
    pub queue: RefCell<Vec<Rc<EffectInner>>>,

    /// Nesting depth of `batch()` calls.
    pub batch_depth: Cell<u32>,

    /// Callbacks queued by `on_mount`, drained after `mount`.
    pub mount_queue: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl ReactiveContext {
    fn new() -> Self {
        Self {
            active_effect: RefCell::new(None),
            untracking: Cell::new(false),
            queue: RefCell::new(Vec::new()),
            batch_depth: Cell::new(0),
            mount_queue: RefCell::new(Vec::new()),
        }
    }
}

thread_local! {
    static CONTEXT: ReactiveContext = ReactiveContext::new();
}

pub(crate) fn with_context<R>(f: impl FnOnce(&ReactiveContext) -> R) -> R {
    CONTEXT.with(f)
}

/// Swap the active effect, returning the previous one.
pub(crate) fn set_active_effect(effect: Option<Rc<EffectInner>>) -> Option<Rc<EffectInner>> {
    with_context(|ctx| ctx.active_effect.replace(effect))
}

/// The effect currently collecting dependencies, unless tracking is
/// suspended by `untrack`.
pub(crate) fn tracking_effect() -> Option<Rc<EffectInner>> {
    with_context(|ctx| {
        if ctx.untracking.get() {
            None
        } else {
            ctx.active_effect.borrow().clone()
        }
    })
}

pub(crate) fn active_effect() -> Option<Rc<EffectInner>> {
    with_context(|ctx| ctx.active_effect.borrow().clone())
}
