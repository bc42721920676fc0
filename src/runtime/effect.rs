//! Effects: functions re-run whenever a reactive value they read changes.

use std::cell::RefCell;
use std::rc::Rc;

use super::context::set_active_effect;
use super::tracking::Dep;

/// Registrar handed to a watch body for an optional cleanup callback,
/// which runs immediately before the next re-run (or on dispose).
#[derive(Default)]
pub struct OnCleanup {
    slot: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl OnCleanup {
    pub fn register(&self, f: impl FnOnce() + 'static) {
        *self.slot.borrow_mut() = Some(Box::new(f));
    }

    fn take(&self) -> Option<Box<dyn FnOnce()>> {
        self.slot.borrow_mut().take()
    }
}

pub(crate) struct EffectInner {
    f: RefCell<Box<dyn FnMut(&OnCleanup)>>,
    /// Every dependency set this effect is currently registered in.
    deps: RefCell<Vec<Dep>>,
    cleanup: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl EffectInner {
    pub(crate) fn new(f: impl FnMut(&OnCleanup) + 'static) -> Rc<Self> {
        Rc::new(EffectInner {
            f: RefCell::new(Box::new(f)),
            deps: RefCell::new(Vec::new()),
            cleanup: RefCell::new(None),
        })
    }

    /// Execute the effect body. Each run starts from a blank dependency
    /// set so it reflects only what this run actually read.
    pub(crate) fn run(self: &Rc<Self>) {
        if let Some(cleanup) = self.cleanup.borrow_mut().take() {
            cleanup();
        }
        self.release_deps();

        let prev = set_active_effect(Some(self.clone()));
        let on_cleanup = OnCleanup::default();
        (self.f.borrow_mut())(&on_cleanup);
        *self.cleanup.borrow_mut() = on_cleanup.take();
        set_active_effect(prev);
    }

    pub(crate) fn register_dep(&self, dep: Dep) {
        self.deps.borrow_mut().push(dep);
    }

    /// Unsubscribe from every dependency set collected by the last run.
    pub(crate) fn release_deps(&self) {
        let deps: Vec<Dep> = self.deps.borrow_mut().drain(..).collect();
        let me = self as *const EffectInner;
        for dep in deps {
            dep.remove(me);
        }
    }

    pub(crate) fn dep_count(&self) -> usize {
        self.deps.borrow().len()
    }
}

/// Owning handle to a registered effect. Sources subscribe to the effect
/// only weakly, so dropping the last handle retires it; `dispose` detaches
/// it eagerly, running any pending cleanup.
#[derive(Clone)]
pub struct Effect {
    pub(crate) inner: Rc<EffectInner>,
}

impl Effect {
    /// Run the pending cleanup and unsubscribe from all dependencies.
    /// A disposed effect still sitting in the flush queue is skipped
    /// because its dependency set is empty.
    pub fn dispose(&self) {
        if let Some(cleanup) = self.inner.cleanup.borrow_mut().take() {
            cleanup();
        }
        self.inner.release_deps();
    }

    /// Number of dependency sets this effect is registered in.
    pub fn dep_count(&self) -> usize {
        self.inner.dep_count()
    }
}

/// Register `f` as a reactive effect and run it once immediately and
/// synchronously. Subsequent runs are scheduled whenever any reactive
/// value read by the previous run changes.
pub fn watch(f: impl FnMut(&OnCleanup) + 'static) -> Effect {
    let inner = EffectInner::new(f);
    inner.run();
    Effect { inner }
}
