//! Dependency edges between reactive sources and effects.
//!
//! Every trackable property owns a `DepSet`: the effects that read it
//! during their last run. Edges to effects are weak so a dropped effect
//! never keeps firing; dead entries are pruned as they are encountered.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::context::{active_effect, tracking_effect};
use super::effect::EffectInner;
use super::scheduling::schedule;

pub(crate) type Dep = Rc<DepSet>;

pub(crate) struct DepSet {
    subscribers: RefCell<Vec<Weak<EffectInner>>>,
}

impl DepSet {
    pub(crate) fn new() -> Dep {
        Rc::new(DepSet {
            subscribers: RefCell::new(Vec::new()),
        })
    }

    /// Register the currently tracking effect as a subscriber. An effect
    /// never appears twice in one set; repeated reads are deduplicated by
    /// identity. Outside of any active effect this is a no-op.
    pub(crate) fn track(self: &Rc<Self>) {
        let effect = match tracking_effect() {
            Some(e) => e,
            None => return,
        };
        if self.contains(&effect) {
            return;
        }
        self.subscribers.borrow_mut().push(Rc::downgrade(&effect));
        effect.register_dep(self.clone());
    }

    /// Schedule every live subscriber for a deferred re-run, skipping the
    /// effect that is itself mid-execution (self-triggering writes).
    pub(crate) fn trigger(&self) {
        let active = active_effect();
        let live: Vec<Rc<EffectInner>> = {
            let mut subs = self.subscribers.borrow_mut();
            subs.retain(|w| w.strong_count() > 0);
            subs.iter().filter_map(|w| w.upgrade()).collect()
        };
        for effect in live {
            let is_active = active
                .as_ref()
                .map(|a| Rc::ptr_eq(a, &effect))
                .unwrap_or(false);
            if !is_active {
                schedule(effect);
            }
        }
    }

    /// Remove one effect by identity. Called when that effect rebuilds its
    /// dependency set before a re-run.
    pub(crate) fn remove(&self, effect: *const EffectInner) {
        self.subscribers.borrow_mut().retain(|w| match w.upgrade() {
            Some(rc) => !std::ptr::eq(Rc::as_ptr(&rc), effect),
            None => false,
        });
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    fn contains(&self, effect: &Rc<EffectInner>) -> bool {
        self.subscribers
            .borrow()
            .iter()
            .any(|w| w.upgrade().map(|rc| Rc::ptr_eq(&rc, effect)).unwrap_or(false))
    }
}
