use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use repose_core::{CompositionLocal, NodeRef};
use smallvec::SmallVec;

use crate::registry::{ChildKey, ChildRecord, ChildRegistry};

thread_local! {
    static NEXT_CONTEXT: Cell<u64> = const { Cell::new(1) };
}

/// Identity of one coordinator context value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

/// Binding through which descendants find their coordinator.
pub type ChildrenLocal<R, D> = CompositionLocal<ChildrenContext<R, D>>;

/// The binding used when no custom one is configured.
pub fn default_children_local<R: 'static, D: 'static>() -> ChildrenLocal<R, D> {
    CompositionLocal::shared()
}

/// Value a coordinator shares with its subtree.
///
/// `register` adds a child record and hands back the capability to change it.
/// `update` re-announces every record to `on_update` in current render order.
pub struct ChildrenContext<R: 'static, D: 'static> {
    id: ContextId,
    registry: ChildRegistry<R, D>,
    rendered: Rc<RefCell<SmallVec<[ChildKey; 8]>>>,
}

impl<R: Clone + 'static, D: Clone + 'static> ChildrenContext<R, D> {
    pub fn new(registry: ChildRegistry<R, D>) -> Self {
        let id = NEXT_CONTEXT.with(|n| {
            let id = n.get();
            n.set(id + 1);
            id
        });
        Self {
            id: ContextId(id),
            registry,
            rendered: Rc::new(RefCell::new(SmallVec::new())),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn registry(&self) -> &ChildRegistry<R, D> {
        &self.registry
    }

    /// Adds a record with no reference yet and the given data.
    pub fn register(&self, data: Option<D>) -> ChildHandle<R, D> {
        let key = self.registry.add(ChildRecord::new(data));
        log::debug!("children: registered {key:?}");
        ChildHandle {
            registry: self.registry.clone(),
            key,
        }
    }

    /// Re-announces every record to `on_update`, once each, in current order.
    ///
    /// Records are first moved into the order their components were last
    /// composed in, so a reorder that kept every child mounted is reflected.
    pub fn update(&self) {
        let rendered = self.rendered.borrow().clone();
        if self.registry.reorder(&rendered) {
            log::debug!("children: resync reordered {} records", self.registry.len());
        }
        self.registry.notify_all();
    }

    /// Starts a new render trace. Called by the coordinator on each pass.
    pub fn begin_pass(&self) {
        self.rendered.borrow_mut().clear();
    }

    /// Records that the child `key` was composed in the current pass.
    pub fn mark_rendered(&self, key: ChildKey) {
        self.rendered.borrow_mut().push(key);
    }
}

impl<R: 'static, D: 'static> Clone for ChildrenContext<R, D> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            registry: self.registry.clone(),
            rendered: self.rendered.clone(),
        }
    }
}

impl<R: 'static, D: 'static> PartialEq for ChildrenContext<R, D> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<R: 'static, D: 'static> fmt::Debug for ChildrenContext<R, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildrenContext").field("id", &self.id).finish()
    }
}

/// Capability over one registered record, owned by the child that registered.
pub struct ChildHandle<R: 'static, D: 'static> {
    registry: ChildRegistry<R, D>,
    key: ChildKey,
}

impl<R: Clone + 'static, D: Clone + 'static> ChildHandle<R, D> {
    pub fn key(&self) -> ChildKey {
        self.key
    }

    /// Replaces the record's data and reports it to `on_update`.
    pub fn update_data(&self, data: Option<D>) {
        self.registry.set_data(self.key, data);
    }

    /// Attaches (`Some`) or detaches (`None`) the native reference.
    pub fn set_ref(&self, node_ref: Option<R>) {
        self.registry.set_ref(self.key, node_ref);
    }

    /// Reference callback bound to this record.
    pub fn node_ref(&self) -> NodeRef<R> {
        let registry = self.registry.clone();
        let key = self.key;
        NodeRef::new(move |node_ref| registry.set_ref(key, node_ref))
    }

    /// Removes the record, detaching its reference first if one is still
    /// attached.
    pub fn unregister(self) {
        let attached = self
            .registry
            .get(self.key)
            .is_some_and(|record| record.node_ref.is_some());
        if attached {
            self.registry.set_ref(self.key, None);
        }
        log::debug!("children: unregistered {:?}", self.key);
        self.registry.remove(self.key);
    }

    // Second handle on the same record, used to call out after the owner's
    // state borrow is released.
    pub(crate) fn share(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            key: self.key,
        }
    }
}

impl<R: 'static, D: 'static> fmt::Debug for ChildHandle<R, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChildHandle").field(&self.key).finish()
    }
}
