use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use repose_core::remember;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Identity of one registered child. Two records with equal contents still
    /// have distinct keys.
    pub struct ChildKey;
}

/// One registered descendant: its native reference, once attached, and the
/// data it chose to publish.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildRecord<R, D> {
    pub node_ref: Option<R>,
    pub data: Option<D>,
}

impl<R, D> ChildRecord<R, D> {
    pub fn new(data: Option<D>) -> Self {
        Self {
            node_ref: None,
            data,
        }
    }
}

impl<R, D> Default for ChildRecord<R, D> {
    fn default() -> Self {
        Self::new(None)
    }
}

pub type OnAdd<R, D> = Rc<dyn Fn(&ChildRecord<R, D>)>;
pub type OnUpdate<R, D> = Rc<dyn Fn(usize, &ChildRecord<R, D>)>;
pub type OnRemove = Rc<dyn Fn(usize)>;

/// Observers notified of registry mutations.
pub struct ChildrenHooks<R, D> {
    pub on_add: Option<OnAdd<R, D>>,
    pub on_update: Option<OnUpdate<R, D>>,
    pub on_remove: Option<OnRemove>,
}

impl<R, D> ChildrenHooks<R, D> {
    pub fn new() -> Self {
        Self {
            on_add: None,
            on_update: None,
            on_remove: None,
        }
    }

    pub fn on_add(mut self, f: impl Fn(&ChildRecord<R, D>) + 'static) -> Self {
        self.on_add = Some(Rc::new(f));
        self
    }

    pub fn on_update(mut self, f: impl Fn(usize, &ChildRecord<R, D>) + 'static) -> Self {
        self.on_update = Some(Rc::new(f));
        self
    }

    pub fn on_remove(mut self, f: impl Fn(usize) + 'static) -> Self {
        self.on_remove = Some(Rc::new(f));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.on_add.is_none() && self.on_update.is_none() && self.on_remove.is_none()
    }
}

impl<R, D> Default for ChildrenHooks<R, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, D> Clone for ChildrenHooks<R, D> {
    fn clone(&self) -> Self {
        Self {
            on_add: self.on_add.clone(),
            on_update: self.on_update.clone(),
            on_remove: self.on_remove.clone(),
        }
    }
}

struct Inner<R, D> {
    records: SlotMap<ChildKey, ChildRecord<R, D>>,
    order: Vec<ChildKey>,
    hooks: ChildrenHooks<R, D>,
}

impl<R, D> Inner<R, D> {
    fn index_of(&self, key: ChildKey) -> Option<usize> {
        self.order.iter().position(|k| *k == key)
    }
}

/// Ordered collection of child records.
///
/// `ChildRegistry` is a cheap handle; clones share the same records. Records
/// keep the order they were added in unless `reorder` is called. Observers are
/// called after the registry has released its borrow, so they may read the
/// registry again.
pub struct ChildRegistry<R: 'static, D: 'static> {
    inner: Rc<RefCell<Inner<R, D>>>,
}

impl<R: Clone + 'static, D: Clone + 'static> ChildRegistry<R, D> {
    pub fn new() -> Self {
        Self::with_hooks(ChildrenHooks::new())
    }

    pub fn with_hooks(hooks: ChildrenHooks<R, D>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                records: SlotMap::with_key(),
                order: Vec::new(),
                hooks,
            })),
        }
    }

    /// Replaces all three observers. Stored records are left alone.
    pub fn set_hooks(&self, hooks: ChildrenHooks<R, D>) {
        self.inner.borrow_mut().hooks = hooks;
    }

    pub fn set_on_add(&self, f: Option<OnAdd<R, D>>) {
        self.inner.borrow_mut().hooks.on_add = f;
    }

    pub fn set_on_update(&self, f: Option<OnUpdate<R, D>>) {
        self.inner.borrow_mut().hooks.on_update = f;
    }

    pub fn set_on_remove(&self, f: Option<OnRemove>) {
        self.inner.borrow_mut().hooks.on_remove = f;
    }

    /// Appends `record` and reports it to `on_add`.
    pub fn add(&self, record: ChildRecord<R, D>) -> ChildKey {
        let (key, hook, record) = {
            let mut inner = self.inner.borrow_mut();
            let key = inner.records.insert(record);
            inner.order.push(key);
            let hook = inner.hooks.on_add.clone();
            let record = hook.as_ref().map(|_| inner.records[key].clone());
            (key, hook, record)
        };
        if let (Some(hook), Some(record)) = (hook, record) {
            hook(&record);
        }
        key
    }

    /// Reports the current index and contents of `key` to `on_update`.
    ///
    /// Absent keys are ignored: a child may race its own removal.
    pub fn update(&self, key: ChildKey) {
        let call = {
            let inner = self.inner.borrow();
            let Some(hook) = inner.hooks.on_update.clone() else {
                return;
            };
            match inner.index_of(key) {
                Some(index) => (hook, index, inner.records[key].clone()),
                None => {
                    log::trace!("update: {key:?} is no longer registered");
                    return;
                }
            }
        };
        let (hook, index, record) = call;
        hook(index, &record);
    }

    /// Removes `key` and reports the index it occupied to `on_remove`.
    pub fn remove(&self, key: ChildKey) -> Option<ChildRecord<R, D>> {
        let (index, record, hook) = {
            let mut inner = self.inner.borrow_mut();
            let Some(index) = inner.index_of(key) else {
                log::trace!("remove: {key:?} is no longer registered");
                return None;
            };
            inner.order.remove(index);
            let record = inner.records.remove(key);
            (index, record, inner.hooks.on_remove.clone())
        };
        if let Some(hook) = hook {
            hook(index);
        }
        record
    }

    /// Mutates the stored record in place, then calls `update`.
    pub fn modify(&self, key: ChildKey, f: impl FnOnce(&mut ChildRecord<R, D>)) {
        let found = {
            let mut inner = self.inner.borrow_mut();
            match inner.records.get_mut(key) {
                Some(record) => {
                    f(record);
                    true
                }
                None => false,
            }
        };
        if found {
            self.update(key);
        } else {
            log::trace!("modify: {key:?} is no longer registered");
        }
    }

    pub fn set_ref(&self, key: ChildKey, node_ref: Option<R>) {
        self.modify(key, |record| record.node_ref = node_ref);
    }

    pub fn set_data(&self, key: ChildKey, data: Option<D>) {
        self.modify(key, |record| record.data = data);
    }

    /// Reports every record to `on_update` once, in current order.
    pub fn notify_all(&self) {
        let (hook, records) = {
            let inner = self.inner.borrow();
            let Some(hook) = inner.hooks.on_update.clone() else {
                return;
            };
            let records: Vec<_> = inner
                .order
                .iter()
                .map(|k| inner.records[*k].clone())
                .collect();
            (hook, records)
        };
        for (index, record) in records.iter().enumerate() {
            hook(index, record);
        }
    }

    /// Moves the given keys to the front, in the given order. Records not
    /// listed follow in their previous relative order. Unknown and repeated
    /// keys are skipped. Returns whether the order changed.
    pub fn reorder(&self, keys: &[ChildKey]) -> bool {
        let mut inner = self.inner.borrow_mut();
        let mut next = Vec::with_capacity(inner.order.len());
        for key in keys {
            if inner.records.contains_key(*key) && !next.contains(key) {
                next.push(*key);
            }
        }
        for key in &inner.order {
            if !next.contains(key) {
                next.push(*key);
            }
        }
        if next == inner.order {
            return false;
        }
        inner.order = next;
        true
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().order.is_empty()
    }

    pub fn contains(&self, key: ChildKey) -> bool {
        self.inner.borrow().records.contains_key(key)
    }

    pub fn index_of(&self, key: ChildKey) -> Option<usize> {
        self.inner.borrow().index_of(key)
    }

    pub fn get(&self, key: ChildKey) -> Option<ChildRecord<R, D>> {
        self.inner.borrow().records.get(key).cloned()
    }

    pub fn keys(&self) -> Vec<ChildKey> {
        self.inner.borrow().order.clone()
    }

    /// Ordered copy of every record.
    pub fn snapshot(&self) -> Vec<ChildRecord<R, D>> {
        let inner = self.inner.borrow();
        inner
            .order
            .iter()
            .map(|k| inner.records[*k].clone())
            .collect()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<R: Clone + 'static, D: Clone + 'static> Default for ChildRegistry<R, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: 'static, D: 'static> Clone for ChildRegistry<R, D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R: fmt::Debug + 'static, D: fmt::Debug + 'static> fmt::Debug for ChildRegistry<R, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_list()
            .entries(inner.order.iter().map(|k| &inner.records[*k]))
            .finish()
    }
}

/// A registry owned by the calling component.
///
/// The instance is created on first use and kept for the scope's lifetime;
/// `hooks` are rebound on every call so observers may capture fresh state.
pub fn remember_registry<R: Clone + 'static, D: Clone + 'static>(
    hooks: ChildrenHooks<R, D>,
) -> ChildRegistry<R, D> {
    let registry = remember(ChildRegistry::<R, D>::new);
    registry.set_hooks(hooks);
    (*registry).clone()
}
