//! Host node tree mutated by the reactive runtime.
//!
//! Generated components build and patch a tree of element and text nodes.
//! The shape follows `markup5ever_rcdom`: `Rc` handles, `RefCell` child
//! lists, weak parent links. Attribute order is preserved because listener
//! registration order is observable.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

pub type Handle = Rc<Node>;
pub type WeakHandle = Weak<Node>;

static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_node_id() -> u64 {
    NODE_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// An event delivered to listeners registered on an element.
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    /// Payload for value-carrying events (e.g. the input value for `input`).
    pub value: Option<String>,
}

impl Event {
    pub fn new(name: &str) -> Self {
        Event {
            name: name.to_string(),
            value: None,
        }
    }

    pub fn with_value(name: &str, value: &str) -> Self {
        Event {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }
}

type Listener = Rc<dyn Fn(&Event)>;

pub enum NodeData {
    Element {
        tag: String,
        attrs: RefCell<Vec<(String, String)>>,
        listeners: RefCell<Vec<(String, Listener)>>,
    },
    Text {
        contents: RefCell<String>,
    },
}

pub struct Node {
    id: u64,
    pub parent: RefCell<Option<WeakHandle>>,
    pub children: RefCell<Vec<Handle>>,
    pub data: NodeData,
}

/// Create a detached element node.
pub fn element(tag: &str) -> Handle {
    Rc::new(Node {
        id: next_node_id(),
        parent: RefCell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            tag: tag.to_string(),
            attrs: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
        },
    })
}

/// Create a detached text node.
pub fn text(contents: &str) -> Handle {
    Rc::new(Node {
        id: next_node_id(),
        parent: RefCell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(contents.to_string()),
        },
    })
}

impl Node {
    /// Identity of this node, stable for its lifetime. Keys side tables
    /// (slot registry) without holding a reference to the node itself.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn tag(&self) -> Option<String> {
        match &self.data {
            NodeData::Element { tag, .. } => Some(tag.clone()),
            NodeData::Text { .. } => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(&self.data, NodeData::Text { .. })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TREE MUTATION
    // ═══════════════════════════════════════════════════════════════════════

    pub fn append_child(self: &Rc<Self>, child: &Handle) {
        child.detach();
        self.children.borrow_mut().push(child.clone());
        *child.parent.borrow_mut() = Some(Rc::downgrade(self));
    }

    /// Insert `new` before `anchor`; with no anchor this appends.
    pub fn insert_before(self: &Rc<Self>, new: &Handle, anchor: Option<&Handle>) {
        new.detach();
        let mut children = self.children.borrow_mut();
        let pos = anchor.and_then(|a| children.iter().position(|c| Rc::ptr_eq(c, a)));
        match pos {
            Some(i) => children.insert(i, new.clone()),
            None => children.push(new.clone()),
        }
        drop(children);
        *new.parent.borrow_mut() = Some(Rc::downgrade(self));
    }

    /// Remove this node from its parent, if attached.
    pub fn detach(self: &Rc<Self>) {
        let parent = self.parent.borrow_mut().take();
        if let Some(weak) = parent {
            if let Some(parent) = weak.upgrade() {
                parent
                    .children
                    .borrow_mut()
                    .retain(|c| !Rc::ptr_eq(c, self));
            }
        }
    }

    /// Drop all current children and adopt `new_children` in order.
    pub fn replace_children(self: &Rc<Self>, new_children: Vec<Handle>) {
        for child in self.children.borrow().iter() {
            *child.parent.borrow_mut() = None;
        }
        self.children.borrow_mut().clear();
        for child in new_children {
            self.append_child(&child);
        }
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn first_child(&self) -> Option<Handle> {
        self.children.borrow().first().cloned()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ATTRIBUTES
    // ═══════════════════════════════════════════════════════════════════════

    /// Set an attribute, updating in place if present so source order
    /// survives repeated writes. No-op on text nodes.
    pub fn set_attribute(&self, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &self.data {
            let mut attrs = attrs.borrow_mut();
            if let Some(slot) = attrs.iter_mut().find(|(n, _)| n == name) {
                slot.1 = value.to_string();
            } else {
                attrs.push((name.to_string(), value.to_string()));
            }
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        match &self.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
            NodeData::Text { .. } => None,
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TEXT
    // ═══════════════════════════════════════════════════════════════════════

    /// Replace the contents of a text node. No-op on elements.
    pub fn set_contents(&self, value: &str) {
        if let NodeData::Text { contents } = &self.data {
            *contents.borrow_mut() = value.to_string();
        }
    }

    /// Concatenated text of this node and its subtree.
    pub fn text_content(&self) -> String {
        match &self.data {
            NodeData::Text { contents } => contents.borrow().clone(),
            NodeData::Element { .. } => self
                .children
                .borrow()
                .iter()
                .map(|c| c.text_content())
                .collect(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // EVENTS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn on(&self, event: &str, handler: impl Fn(&Event) + 'static) {
        if let NodeData::Element { listeners, .. } = &self.data {
            listeners
                .borrow_mut()
                .push((event.to_string(), Rc::new(handler)));
        }
    }

    /// Deliver an event to every listener registered for its name, in
    /// registration order. No capture/bubble phases.
    pub fn emit(&self, event: &Event) {
        if let NodeData::Element { listeners, .. } = &self.data {
            let matched: Vec<Listener> = listeners
                .borrow()
                .iter()
                .filter(|(name, _)| *name == event.name)
                .map(|(_, l)| l.clone())
                .collect();
            for listener in matched {
                listener(event);
            }
        }
    }

    /// Structural copy with fresh ids. Listeners are not cloned, matching
    /// the host-DOM cloneNode contract slot content relies on.
    pub fn deep_clone(&self) -> Handle {
        let clone = match &self.data {
            NodeData::Element { tag, attrs, .. } => {
                let el = element(tag);
                if let NodeData::Element { attrs: new_attrs, .. } = &el.data {
                    *new_attrs.borrow_mut() = attrs.borrow().clone();
                }
                el
            }
            NodeData::Text { contents } => text(&contents.borrow()),
        };
        for child in self.children.borrow().iter() {
            clone.append_child(&child.deep_clone());
        }
        clone
    }
}
