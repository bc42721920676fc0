//! Named content projection between component instances.
//!
//! A thread-local registry associates a component's host element with a
//! map from slot name to content producer. The registry is keyed by node
//! id, so it holds no reference to the host element itself; `clear_slots`
//! releases an entry explicitly.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::host::Handle;

/// One producer of projected content.
#[derive(Clone)]
pub enum SlotContent {
    /// Callback building content directly into the target parent. The
    /// optional scope identifier is stamped by the builder so projected
    /// content participates in the host component's style scoping.
    Build(Rc<dyn Fn(&Handle, Option<&str>)>),
    /// Pre-built node, deep-cloned on every render so the slot can render
    /// more than once.
    Node(Handle),
    /// Ordered list of producers rendered in sequence.
    Many(Vec<SlotContent>),
}

type SlotMap = HashMap<String, SlotContent>;

thread_local! {
    static REGISTRY: RefCell<HashMap<u64, SlotMap>> = RefCell::new(HashMap::new());
}

/// Associate a full slot map with a component host element, replacing any
/// previous registration.
pub fn set_slots(target: &Handle, slots: SlotMap) {
    REGISTRY.with(|r| {
        r.borrow_mut().insert(target.id(), slots);
    });
}

/// Register one named producer, merging into the host's existing map.
pub fn register_slot(target: &Handle, name: &str, content: SlotContent) {
    REGISTRY.with(|r| {
        r.borrow_mut()
            .entry(target.id())
            .or_default()
            .insert(name.to_string(), content);
    });
}

/// Look up a producer by name, falling back to `"default"` when the
/// requested name is absent.
pub fn get_slot(target: &Handle, name: &str) -> Option<SlotContent> {
    REGISTRY.with(|r| {
        let registry = r.borrow();
        let slots = registry.get(&target.id())?;
        slots.get(name).or_else(|| slots.get("default")).cloned()
    })
}

pub fn clear_slots(target: &Handle) {
    REGISTRY.with(|r| {
        r.borrow_mut().remove(&target.id());
    });
}

/// Render a producer into `parent`. Builders receive the scope identifier
/// to stamp themselves; pre-built nodes are cloned and stamped here.
pub fn render_slot(content: &SlotContent, parent: &Handle, scope_id: Option<&str>) {
    match content {
        SlotContent::Build(build) => build(parent, scope_id),
        SlotContent::Node(node) => {
            let clone = node.deep_clone();
            if let Some(scope_id) = scope_id {
                clone.set_attribute(scope_id, "");
            }
            parent.append_child(&clone);
        }
        SlotContent::Many(items) => {
            for item in items {
                render_slot(item, parent, scope_id);
            }
        }
    }
}

/// Normalize a parent's child content into the host's default slot:
/// builders pass through, nodes become clone-on-render producers, lists
/// flatten in order. No-op for empty content.
pub fn process_slots(children: Vec<SlotContent>, target: &Handle) {
    if children.is_empty() {
        return;
    }
    let content = if children.len() == 1 {
        children.into_iter().next().expect("len checked")
    } else {
        SlotContent::Many(children)
    };
    register_slot(target, "default", content);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{element, text};

    #[test]
    fn named_lookup_with_default_fallback() {
        let host = element("div");
        let mut slots = SlotMap::new();
        slots.insert("default".to_string(), SlotContent::Node(text("fallback")));
        slots.insert("header".to_string(), SlotContent::Node(text("title")));
        set_slots(&host, slots);

        let parent = element("section");
        render_slot(&get_slot(&host, "header").unwrap(), &parent, None);
        render_slot(&get_slot(&host, "footer").unwrap(), &parent, None);
        assert_eq!(parent.text_content(), "titlefallback");

        clear_slots(&host);
        assert!(get_slot(&host, "header").is_none());
    }

    #[test]
    fn builder_receives_parent_and_scope() {
        let host = element("div");
        register_slot(
            &host,
            "default",
            SlotContent::Build(Rc::new(|parent, scope_id| {
                let span = element("span");
                if let Some(scope_id) = scope_id {
                    span.set_attribute(scope_id, "");
                }
                span.append_child(&text("built"));
                parent.append_child(&span);
            })),
        );

        let parent = element("div");
        render_slot(
            &get_slot(&host, "default").unwrap(),
            &parent,
            Some("data-s-abc123"),
        );
        let span = parent.first_child().unwrap();
        assert!(span.has_attribute("data-s-abc123"));
        assert_eq!(span.text_content(), "built");
    }

    #[test]
    fn node_content_is_cloned_per_render() {
        let host = element("div");
        let original = element("p");
        original.append_child(&text("once"));
        register_slot(&host, "default", SlotContent::Node(original.clone()));

        let a = element("div");
        let b = element("div");
        let slot = get_slot(&host, "default").unwrap();
        render_slot(&slot, &a, Some("data-s-x"));
        render_slot(&slot, &b, None);

        assert_eq!(a.text_content(), "once");
        assert_eq!(b.text_content(), "once");
        // the original stays detached and unstamped
        assert!(original.parent.borrow().is_none());
        assert!(!original.has_attribute("data-s-x"));
    }

    #[test]
    fn ordered_list_of_producers() {
        let host = element("div");
        process_slots(
            vec![
                SlotContent::Node(text("one")),
                SlotContent::Node(text("two")),
            ],
            &host,
        );

        let parent = element("div");
        render_slot(&get_slot(&host, "default").unwrap(), &parent, None);
        assert_eq!(parent.text_content(), "onetwo");
    }
}
