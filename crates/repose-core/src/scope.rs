use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Weak<ScopeInner>>> = const { RefCell::new(None) };
}

/// One mounted component instance.
///
/// A scope owns the `remember` slots of its component, its child scopes and
/// the cleanups registered while it was composed. Disposing a scope unmounts
/// the whole subtree.
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    slots: RefCell<Vec<Box<dyn Any>>>,
    cursor: Cell<usize>,
    keyed_slots: RefCell<HashMap<String, Box<dyn Any>>>,
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Scope>>,
    keyed_children: RefCell<Vec<(String, Scope)>>,
    visited: RefCell<Vec<String>>,
    disposed: Cell<bool>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                slots: RefCell::new(Vec::new()),
                cursor: Cell::new(0),
                keyed_slots: RefCell::new(HashMap::new()),
                disposers: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
                keyed_children: RefCell::new(Vec::new()),
                visited: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Evaluates `f` as this scope's component body.
    ///
    /// The slot cursor starts from zero, so the Nth `remember` inside `f`
    /// always sees the Nth slot. Keyed children not visited by `f` are
    /// unmounted once it returns.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        struct Restore(Option<Weak<ScopeInner>>);
        impl Drop for Restore {
            fn drop(&mut self) {
                let prev = self.0.take();
                CURRENT_SCOPE.with(|current| *current.borrow_mut() = prev);
            }
        }

        self.inner.cursor.set(0);
        self.inner.visited.borrow_mut().clear();

        let prev = CURRENT_SCOPE.with(|current| {
            current.replace(Some(Rc::downgrade(&self.inner)))
        });
        let restore = Restore(prev);
        let result = f();
        drop(restore);

        self.unmount_unvisited();
        result
    }

    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    pub fn child(&self) -> Scope {
        let child = Scope::new();
        self.inner.children.borrow_mut().push(child.clone());
        child
    }

    /// Child scope that survives re-evaluation of this scope as long as `key`
    /// is requested again during every `run`.
    pub fn keyed_child(&self, key: impl Into<String>) -> Scope {
        let key = key.into();
        self.inner.visited.borrow_mut().push(key.clone());

        let mut keyed = self.inner.keyed_children.borrow_mut();
        if let Some((_, scope)) = keyed.iter().find(|(k, _)| *k == key) {
            return scope.clone();
        }
        let child = Scope::new();
        keyed.push((key, child.clone()));
        child
    }

    /// Unmounts the keyed child `key` right away. Returns whether it existed.
    pub fn remove_child(&self, key: &str) -> bool {
        let removed = {
            let mut keyed = self.inner.keyed_children.borrow_mut();
            keyed
                .iter()
                .position(|(k, _)| k == key)
                .map(|i| keyed.remove(i).1)
        };
        match removed {
            Some(scope) => {
                scope.dispose();
                true
            }
            None => false,
        }
    }

    pub fn child_keys(&self) -> Vec<String> {
        self.inner
            .keyed_children
            .borrow()
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn next_slot<T: 'static>(&self, init: impl FnOnce() -> T) -> Rc<T> {
        let cursor = self.inner.cursor.get();
        self.inner.cursor.set(cursor + 1);

        if let Some(slot) = self.inner.slots.borrow().get(cursor) {
            if let Some(rc) = slot.downcast_ref::<Rc<T>>() {
                return rc.clone();
            }
            log::warn!(
                "remember: slot {} type changed; replacing. \
                 If this is due to conditional composition, prefer remember_with_key.",
                cursor
            );
        }

        let rc: Rc<T> = Rc::new(init());
        let mut slots = self.inner.slots.borrow_mut();
        if cursor < slots.len() {
            slots[cursor] = Box::new(rc.clone());
        } else {
            slots.push(Box::new(rc.clone()));
        }
        rc
    }

    pub(crate) fn keyed_slot<T: 'static>(&self, key: String, init: impl FnOnce() -> T) -> Rc<T> {
        if let Some(existing) = self.inner.keyed_slots.borrow().get(&key) {
            if let Some(rc) = existing.downcast_ref::<Rc<T>>() {
                return rc.clone();
            }
            log::warn!(
                "remember_with_key: key '{}' reused with a different type; replacing.",
                key
            );
        }

        let rc: Rc<T> = Rc::new(init());
        self.inner
            .keyed_slots
            .borrow_mut()
            .insert(key, Box::new(rc.clone()));
        rc
    }

    fn unmount_unvisited(&self) {
        let stale: Vec<Scope> = {
            let visited = self.inner.visited.borrow();
            let mut keyed = self.inner.keyed_children.borrow_mut();
            let mut stale = Vec::new();
            keyed.retain(|(k, scope)| {
                if visited.contains(k) {
                    true
                } else {
                    stale.push(scope.clone());
                    false
                }
            });
            stale
        };
        for scope in stale {
            scope.dispose();
        }
    }

    /// Unmounts this scope: children first, in mount order, then this scope's
    /// own disposers, last installed first.
    pub fn dispose(self) {
        if self.inner.disposed.replace(true) {
            return;
        }

        let children = std::mem::take(&mut *self.inner.children.borrow_mut());
        for child in children {
            child.dispose();
        }
        let keyed = std::mem::take(&mut *self.inner.keyed_children.borrow_mut());
        for (_, child) in keyed {
            child.dispose();
        }

        let disposers = std::mem::take(&mut *self.inner.disposers.borrow_mut());
        for disposer in disposers.into_iter().rev() {
            disposer();
        }

        // Slots may hold values whose drop re-enters the runtime.
        let slots = std::mem::take(&mut *self.inner.slots.borrow_mut());
        drop(slots);
        let keyed_slots = std::mem::take(&mut *self.inner.keyed_slots.borrow_mut());
        drop(keyed_slots);
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub fn current_scope() -> Option<Scope> {
    CURRENT_SCOPE.with(|current| {
        current
            .borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade().map(|inner| Scope { inner }))
    })
}

/// Scoped effect that auto-cleans up
pub fn scoped_effect<F>(f: F)
where
    F: FnOnce() -> Box<dyn FnOnce()> + 'static,
{
    if let Some(scope) = current_scope() {
        let cleanup = f();
        scope.add_disposer(cleanup);
    } else {
        // No scope, run immediately and leak
        let _ = f();
    }
}
