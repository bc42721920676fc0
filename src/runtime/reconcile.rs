//! Position-keyed incremental list rendering.
//!
//! Rows are matched strictly by position, never by key or identity:
//! reordering the same logical items mutates the existing rows' signals
//! rather than moving nodes. That is the documented tradeoff of the
//! design, not a defect.

use crate::host::Handle;

use super::signal::Signal;

/// One rendered list position: its host node plus the two per-position
/// signals the builder closed over.
pub struct LiveRow<T: Clone + PartialEq + 'static> {
    pub node: Handle,
    item: Signal<T>,
    index: Signal<usize>,
}

/// Synchronize `live` against `data`. Excess trailing rows are removed
/// from the host tree; missing positions are built via
/// `build(item_signal, index_signal)` and inserted before `anchor`;
/// existing positions have their signals updated in place, so only the
/// reactive work downstream of those signals runs — no node rebuild.
pub fn reconcile<T, F>(
    parent: &Handle,
    anchor: Option<&Handle>,
    live: &mut Vec<LiveRow<T>>,
    data: &[T],
    build: F,
) where
    T: Clone + PartialEq + 'static,
    F: Fn(Signal<T>, Signal<usize>) -> Handle,
{
    while live.len() > data.len() {
        if let Some(row) = live.pop() {
            row.node.detach();
        }
    }

    for (i, item) in data.iter().enumerate() {
        if i >= live.len() {
            let item_signal = Signal::new(item.clone());
            let index_signal = Signal::new(i);
            let node = build(item_signal.clone(), index_signal.clone());
            parent.insert_before(&node, anchor);
            live.push(LiveRow {
                node,
                item: item_signal,
                index: index_signal,
            });
        } else {
            live[i].item.set(item.clone());
            live[i].index.set(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{element, text};
    use crate::runtime::effect::{watch, Effect};
    use crate::runtime::scheduling::tick;
    use std::cell::RefCell;
    use std::rc::Rc;

    // Row builder whose per-row effect handles outlive the build call.
    fn row_builder(
        effects: &Rc<RefCell<Vec<Effect>>>,
    ) -> impl Fn(Signal<String>, Signal<usize>) -> Handle {
        let effects = effects.clone();
        move |item, _index| {
            let li = element("li");
            let label = text("");
            li.append_child(&label);
            let label_c = label.clone();
            effects
                .borrow_mut()
                .push(watch(move |_| label_c.set_contents(&item.get())));
            li
        }
    }

    #[test]
    fn grows_by_building_rows_before_anchor() {
        let parent = element("ul");
        let anchor = text("");
        parent.append_child(&anchor);
        let effects = Rc::new(RefCell::new(Vec::new()));

        let mut live = Vec::new();
        let data = vec!["a".to_string(), "b".to_string()];
        reconcile(&parent, Some(&anchor), &mut live, &data, row_builder(&effects));

        assert_eq!(live.len(), 2);
        assert_eq!(parent.child_count(), 3); // 2 rows + anchor
        assert_eq!(parent.text_content(), "ab");
        // anchor stays last
        assert!(Rc::ptr_eq(&parent.children.borrow()[2], &anchor));
    }

    #[test]
    fn shrink_to_empty_removes_all_rows() {
        let parent = element("ul");
        let effects = Rc::new(RefCell::new(Vec::new()));
        let mut live = Vec::new();
        let data: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        reconcile(&parent, None, &mut live, &data, row_builder(&effects));
        assert_eq!(live.len(), 3);

        reconcile(&parent, None, &mut live, &[], row_builder(&effects));
        assert!(live.is_empty());
        assert_eq!(parent.child_count(), 0);
    }

    #[test]
    fn existing_positions_update_in_place() {
        let parent = element("ul");
        let effects = Rc::new(RefCell::new(Vec::new()));
        let mut live = Vec::new();
        reconcile(
            &parent,
            None,
            &mut live,
            &["a".to_string(), "b".to_string()],
            row_builder(&effects),
        );
        let first_node = live[0].node.clone();
        let built = effects.borrow().len();

        reconcile(
            &parent,
            None,
            &mut live,
            &["b".to_string(), "a".to_string()],
            row_builder(&effects),
        );
        tick();

        // same nodes, mutated content: positional matching, no movement
        assert!(Rc::ptr_eq(&live[0].node, &first_node));
        assert_eq!(effects.borrow().len(), built); // nothing rebuilt
        assert_eq!(parent.text_content(), "ba");
    }
}
