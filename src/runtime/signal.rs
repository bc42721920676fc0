//! The signal: a single observable mutable value cell.

use std::cell::RefCell;
use std::rc::Rc;

use super::tracking::{Dep, DepSet};

struct SignalInner<T> {
    value: RefCell<T>,
    dep: Dep,
}

/// A mutable reactive cell. Reads performed while an effect is active
/// register that effect as a dependent; writes that change the value
/// schedule every dependent for a deferred re-run. Cloning the handle
/// aliases the same cell.
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Signal {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Signal {
            inner: Rc::new(SignalInner {
                value: RefCell::new(value),
                dep: DepSet::new(),
            }),
        }
    }

    /// Read the current value, tracking the active effect.
    pub fn get(&self) -> T {
        self.inner.dep.track();
        self.inner.value.borrow().clone()
    }

    /// Read through a closure without cloning the value. Still tracks.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.dep.track();
        f(&self.inner.value.borrow())
    }

    /// Read without tracking, regardless of any active effect.
    pub fn peek(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Write a new value. Writing a value equal to the current one is a
    /// no-op: no dependents are notified.
    pub fn set(&self, value: T) {
        {
            let current = self.inner.value.borrow();
            if *current == value {
                return;
            }
        }
        *self.inner.value.borrow_mut() = value;
        self.inner.dep.trigger();
    }

    /// Derive the next value from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.inner.value.borrow());
        self.set(next);
    }

    /// Number of effects currently subscribed. Test and introspection aid.
    pub fn subscriber_count(&self) -> usize {
        self.inner.dep.subscriber_count()
    }
}

/// Shorthand constructor mirroring the runtime's `$signal` primitive.
pub fn signal<T: Clone + PartialEq + 'static>(value: T) -> Signal<T> {
    Signal::new(value)
}
