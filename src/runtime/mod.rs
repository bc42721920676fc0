//! The reactive runtime: observable cells, dependency tracking, batched
//! scheduling, derived values, list reconciliation and slot projection.
//!
//! Everything here is single-threaded by construction (`Rc`/`RefCell`,
//! thread-local context); there is no locking because there is no
//! parallelism.

mod context;
mod tracking;

pub mod computed;
pub mod effect;
pub mod reconcile;
pub mod scheduling;
pub mod signal;
pub mod slots;
pub mod store;

pub use computed::{computed, Computed};
pub use effect::{watch, Effect, OnCleanup};
pub use reconcile::{reconcile, LiveRow};
pub use scheduling::{batch, tick, untrack};
pub use signal::{signal, Signal};
pub use slots::{
    clear_slots, get_slot, process_slots, register_slot, render_slot, set_slots, SlotContent,
};
pub use store::{store, Store};

use crate::host::Handle;

/// Queue a callback to run after the current `mount` completes.
pub fn on_mount(f: impl FnOnce() + 'static) {
    context::with_context(|ctx| ctx.mount_queue.borrow_mut().push(Box::new(f)));
}

/// Invoke a component closure against a host node, then drain the
/// callbacks it queued via `on_mount`.
pub fn mount(component: impl FnOnce(&Handle), target: &Handle) {
    component(target);
    let queued: Vec<Box<dyn FnOnce()>> =
        context::with_context(|ctx| ctx.mount_queue.borrow_mut().drain(..).collect());
    for f in queued {
        f();
    }
}
