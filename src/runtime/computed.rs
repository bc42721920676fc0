//! Memoized derived values with dirty-flag invalidation.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::context::set_active_effect;
use super::effect::EffectInner;
use super::tracking::{Dep, DepSet};

struct ComputedInner<T> {
    value: RefCell<Option<T>>,
    dirty: Cell<bool>,
    /// Dependents of the computed value itself.
    dep: Dep,
    /// Internal runner the getter's reads are attributed to. Its body
    /// never recomputes: it only marks the value dirty and notifies
    /// dependents, so a change costs one invalidation regardless of how
    /// many reads follow.
    runner: RefCell<Option<Rc<EffectInner>>>,
    getter: RefCell<Box<dyn FnMut() -> T>>,
}

/// A memoized derived value. Reading tracks the caller as a dependent and
/// re-invokes the getter only when a dependency changed since the last
/// read — exactly once per change, however many reads occur in between.
pub struct Computed<T> {
    inner: Rc<ComputedInner<T>>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Computed {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Computed<T> {
    pub fn new(getter: impl FnMut() -> T + 'static) -> Self {
        let inner = Rc::new(ComputedInner {
            value: RefCell::new(None),
            dirty: Cell::new(true),
            dep: DepSet::new(),
            runner: RefCell::new(None),
            getter: RefCell::new(Box::new(getter)),
        });

        let weak = Rc::downgrade(&inner);
        let runner = EffectInner::new(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.dirty.set(true);
                inner.dep.trigger();
            }
        });
        *inner.runner.borrow_mut() = Some(runner);

        Computed { inner }
    }

    pub fn get(&self) -> T {
        self.inner.dep.track();
        if self.inner.dirty.get() {
            let runner = self
                .inner
                .runner
                .borrow()
                .clone()
                .expect("computed runner always present");
            // Attribute the getter's reads to the runner, not the reader.
            runner.release_deps();
            let prev = set_active_effect(Some(runner));
            let value = (self.inner.getter.borrow_mut())();
            set_active_effect(prev);
            *self.inner.value.borrow_mut() = Some(value);
            self.inner.dirty.set(false);
        }
        self.inner
            .value
            .borrow()
            .clone()
            .expect("computed value present after recompute")
    }
}

/// Shorthand constructor mirroring the runtime's `$computed` primitive.
pub fn computed<T: Clone + 'static>(getter: impl FnMut() -> T + 'static) -> Computed<T> {
    Computed::new(getter)
}
