//! Reactive object wrapper: transparent property-level tracking over a
//! plain keyed-attribute value (`serde_json::Value` object or array).
//!
//! Rust has no property interception, so the wrapper is an explicit
//! accessor object: `get`/`set`/`at` are the interception points. A
//! `Store` is a cheap handle onto a shared root plus a path into it;
//! nested objects are wrapped lazily on read by extending the path, and
//! cloning a handle aliases the same reactive root, which makes wrapping
//! idempotent and memoized by construction.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use super::tracking::{Dep, DepSet};

struct StoreRoot {
    value: RefCell<Value>,
    /// One dependency set per tracked (path, property) pair, built lazily.
    deps: RefCell<HashMap<String, Dep>>,
}

impl StoreRoot {
    fn dep_for(&self, path: &str) -> Dep {
        self.deps
            .borrow_mut()
            .entry(path.to_string())
            .or_insert_with(DepSet::new)
            .clone()
    }

    /// Trigger only if the pair was ever tracked; writes to never-read
    /// properties have no dependents by definition.
    fn trigger(&self, path: &str) {
        let dep = self.deps.borrow().get(path).cloned();
        if let Some(dep) = dep {
            dep.trigger();
        }
    }
}

#[derive(Clone)]
pub struct Store {
    root: Rc<StoreRoot>,
    path: String,
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn resolve<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    let mut current = value;
    for seg in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(seg)?,
            Value::Array(items) => items.get(seg.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn resolve_mut<'a>(value: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    if path.is_empty() {
        return Some(value);
    }
    let mut current = value;
    for seg in path.split('.') {
        current = match current {
            Value::Object(map) => map.get_mut(seg)?,
            Value::Array(items) => {
                let i = seg.parse::<usize>().ok()?;
                items.get_mut(i)?
            }
            _ => return None,
        };
    }
    Some(current)
}

impl Store {
    /// Wrap a plain object or array in a reactive root.
    pub fn new(value: Value) -> Store {
        Store {
            root: Rc::new(StoreRoot {
                value: RefCell::new(value),
                deps: RefCell::new(HashMap::new()),
            }),
            path: String::new(),
        }
    }

    /// Whether two handles address the same reactive root.
    pub fn same_root(&self, other: &Store) -> bool {
        Rc::ptr_eq(&self.root, &other.root)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // READS (tracking)
    // ═══════════════════════════════════════════════════════════════════════

    /// Read a property, registering the active effect as a dependent of
    /// this exact (object, property) pair. Missing keys read as `Null`.
    pub fn get(&self, key: &str) -> Value {
        let path = join(&self.path, key);
        self.root.dep_for(&path).track();
        resolve(&self.root.value.borrow(), &path)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Lazily wrap a nested object or array: a sub-handle sharing this
    /// root, addressed one property deeper. The read is tracked.
    pub fn at(&self, key: &str) -> Store {
        let path = join(&self.path, key);
        self.root.dep_for(&path).track();
        Store {
            root: self.root.clone(),
            path,
        }
    }

    /// Read an array element by position.
    pub fn get_index(&self, index: usize) -> Value {
        self.get(&index.to_string())
    }

    pub fn at_index(&self, index: usize) -> Store {
        self.at(&index.to_string())
    }

    /// Length of the wrapped array, tracked against the `length` pair so
    /// size-derived computations re-run when the array grows or shrinks.
    pub fn len(&self) -> usize {
        self.root.dep_for(&join(&self.path, "length")).track();
        match resolve(&self.root.value.borrow(), &self.path) {
            Some(Value::Array(items)) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Untracked clone of the addressed subtree.
    pub fn snapshot(&self) -> Value {
        resolve(&self.root.value.borrow(), &self.path)
            .cloned()
            .unwrap_or(Value::Null)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // WRITES (triggering)
    // ═══════════════════════════════════════════════════════════════════════

    /// Write a property. A write equal to the stored value is silently a
    /// no-op; otherwise every dependent of the pair is scheduled.
    pub fn set(&self, key: &str, value: Value) {
        let mut trigger_length = false;
        {
            let mut root_value = self.root.value.borrow_mut();
            let container = match resolve_mut(&mut root_value, &self.path) {
                Some(c) => c,
                None => return,
            };
            match container {
                Value::Object(map) => {
                    if map.get(key) == Some(&value) {
                        return;
                    }
                    map.insert(key.to_string(), value);
                }
                Value::Array(items) => {
                    let index = match key.parse::<usize>() {
                        Ok(i) => i,
                        Err(_) => return,
                    };
                    match items.get_mut(index) {
                        Some(slot) if *slot == value => return,
                        Some(slot) => *slot = value,
                        None => return,
                    }
                    trigger_length = true;
                }
                _ => return,
            }
        }
        self.root.trigger(&join(&self.path, key));
        if trigger_length {
            self.root.trigger(&join(&self.path, "length"));
        }
    }

    /// Write an array element in place. Index writes also schedule the
    /// dependents of the array's length.
    pub fn set_index(&self, index: usize, value: Value) {
        self.set(&index.to_string(), value);
    }

    /// Append to the wrapped array, scheduling length dependents.
    pub fn push(&self, value: Value) {
        let new_index;
        {
            let mut root_value = self.root.value.borrow_mut();
            match resolve_mut(&mut root_value, &self.path) {
                Some(Value::Array(items)) => {
                    new_index = items.len();
                    items.push(value);
                }
                _ => return,
            }
        }
        self.root.trigger(&join(&self.path, &new_index.to_string()));
        self.root.trigger(&join(&self.path, "length"));
    }

    /// Shrink the wrapped array, scheduling the removed positions and the
    /// length.
    pub fn truncate(&self, len: usize) {
        let old_len;
        {
            let mut root_value = self.root.value.borrow_mut();
            match resolve_mut(&mut root_value, &self.path) {
                Some(Value::Array(items)) => {
                    old_len = items.len();
                    if len >= old_len {
                        return;
                    }
                    items.truncate(len);
                }
                _ => return,
            }
        }
        for i in len..old_len {
            self.root.trigger(&join(&self.path, &i.to_string()));
        }
        self.root.trigger(&join(&self.path, "length"));
    }
}

/// Shorthand constructor mirroring the runtime's `$signals` primitive.
pub fn store(value: Value) -> Store {
    Store::new(value)
}
