use crate::{Dispose, NodeRef, on_unmount, remember, scoped_effect};
use std::cell::RefCell;

/// Cleanup on key change or unmount.
///
/// Returns `true` when `effect` ran during this call.
pub fn disposable_effect<K: PartialEq + Clone + 'static>(
    key: K,
    effect: impl FnOnce() -> Dispose + 'static,
) -> bool {
    // Slot-based (like Compose).
    let last_key = remember(|| RefCell::new(None::<K>));
    let cleanup_slot = remember(|| RefCell::new(None::<Dispose>));
    let installed = remember(|| RefCell::new(false));

    // Install a single unmount disposer for this callsite.
    if !*installed.borrow() {
        *installed.borrow_mut() = true;
        let cleanup_slot = cleanup_slot.clone();
        scoped_effect(move || {
            Box::new(move || {
                let d = cleanup_slot.borrow_mut().take();
                if let Some(d) = d {
                    d.run();
                }
            })
        });
    }

    // Key change: cleanup previous + run new effect
    let changed = last_key.borrow().as_ref() != Some(&key);
    if changed {
        *last_key.borrow_mut() = Some(key);

        let previous = cleanup_slot.borrow_mut().take();
        if let Some(d) = previous {
            d.run();
        }

        let d = effect();
        *cleanup_slot.borrow_mut() = Some(d);
    }
    changed
}

struct RefBinding<E: 'static> {
    element: Option<E>,
    target: Option<NodeRef<E>>,
}

/// Binds `element` to `target` for the lifetime of the current scope.
///
/// `target` receives the element on the first call, `None` followed by the new
/// element whenever either the element or the target changes, and a final
/// `None` on unmount.
pub fn bind_node_ref<E: Clone + PartialEq + 'static>(element: E, target: &NodeRef<E>) {
    let binding = remember(|| {
        RefCell::new(RefBinding::<E> {
            element: None,
            target: None,
        })
    });
    let installed = remember(|| RefCell::new(false));

    if !*installed.borrow() {
        *installed.borrow_mut() = true;
        let binding = binding.clone();
        scoped_effect(move || {
            let detach = on_unmount(move || {
                let last = binding.borrow_mut().target.take();
                if let Some(target) = last {
                    target.detach();
                }
            });
            Box::new(move || detach.run())
        });
    }

    let unchanged = {
        let b = binding.borrow();
        b.element.as_ref() == Some(&element)
            && b.target.as_ref().is_some_and(|t| t.ptr_eq(target))
    };
    if unchanged {
        return;
    }

    let previous = binding.borrow_mut().target.take();
    if let Some(previous) = previous {
        previous.detach();
    }
    target.attach(element.clone());
    *binding.borrow_mut() = RefBinding {
        element: Some(element),
        target: Some(target.clone()),
    };
}
