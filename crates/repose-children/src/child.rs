use std::cell::RefCell;
use std::rc::Rc;

use repose_core::{
    Dispose, NodeRef, bind_node_ref, disposable_effect, on_unmount, remember, remember_state,
};

use crate::context::{ChildHandle, ChildrenContext, ChildrenLocal, default_children_local};
use crate::error::ChildrenError;
use crate::registry::ChildKey;

/// Options for `use_child` and friends.
pub struct ChildOptions<R: 'static, D: 'static> {
    /// Without a provider, return a stand-in instead of an error.
    pub optional: bool,
    /// Binding to resolve the provider through; the default binding if unset.
    pub context: Option<ChildrenLocal<R, D>>,
}

impl<R: 'static, D: 'static> ChildOptions<R, D> {
    pub fn new() -> Self {
        Self {
            optional: false,
            context: None,
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn context(mut self, local: ChildrenLocal<R, D>) -> Self {
        self.context = Some(local);
        self
    }
}

impl<R: 'static, D: 'static> Default for ChildOptions<R, D> {
    fn default() -> Self {
        Self::new()
    }
}

struct Registration<R: 'static, D: 'static> {
    handle: Option<ChildHandle<R, D>>,
    node_ref: Option<NodeRef<R>>,
    // Set when a handle is obtained; the evaluation that registered already
    // carried the data.
    skip_next: bool,
    last_data: Option<D>,
}

type Shared<R, D> = Rc<RefCell<Registration<R, D>>>;

fn register_child<R, D>(
    data: Option<D>,
    track_data: bool,
    options: ChildOptions<R, D>,
) -> Result<Shared<R, D>, ChildrenError>
where
    R: Clone + 'static,
    D: Clone + PartialEq + 'static,
{
    let local = options.context.unwrap_or_else(default_children_local);
    let ctx = local.current();
    if ctx.is_none() && !options.optional {
        return Err(ChildrenError::MissingProvider);
    }

    let state: Shared<R, D> = remember_state(|| Registration {
        handle: None,
        node_ref: None,
        skip_next: false,
        last_data: None,
    });

    // One registration per context instance; a new context unregisters the
    // old record before registering again.
    disposable_effect(ctx.as_ref().map(ChildrenContext::id), {
        let state = state.clone();
        let ctx = ctx.clone();
        let data = data.clone();
        move || {
            let Some(ctx) = ctx else {
                return Dispose::noop();
            };
            let handle = ctx.register(data.clone());
            {
                let mut s = state.borrow_mut();
                s.node_ref = Some(handle.node_ref());
                s.handle = Some(handle);
                s.skip_next = true;
                s.last_data = data;
            }
            on_unmount(move || {
                let handle = {
                    let mut s = state.borrow_mut();
                    s.node_ref = None;
                    s.handle.take()
                };
                if let Some(handle) = handle {
                    handle.unregister();
                }
            })
        }
    });

    let publish = {
        let mut s = state.borrow_mut();
        if let (Some(ctx), Some(handle)) = (ctx.as_ref(), s.handle.as_ref()) {
            ctx.mark_rendered(handle.key());
        }
        if s.skip_next {
            s.skip_next = false;
            None
        } else if track_data && s.last_data != data {
            s.last_data = data.clone();
            s.handle.as_ref().map(ChildHandle::share)
        } else {
            None
        }
    };
    if let Some(handle) = publish {
        handle.update_data(data);
    }

    Ok(state)
}

/// Registers the calling component with the nearest `ChildrenProvider`.
///
/// Returns the reference callback to bind to the component's native element.
/// Whenever `data` differs from the previous evaluation it is published to
/// `on_update`. Outside any provider this fails with
/// `ChildrenError::MissingProvider`, unless `options.optional` is set, in which
/// case the returned callback does nothing.
pub fn use_child<R, D>(
    data: Option<D>,
    options: ChildOptions<R, D>,
) -> Result<NodeRef<R>, ChildrenError>
where
    R: Clone + 'static,
    D: Clone + PartialEq + 'static,
{
    let noop = remember(NodeRef::<R>::noop);
    let state = register_child(data, true, options)?;
    let node_ref = state.borrow().node_ref.clone();
    Ok(node_ref.unwrap_or_else(|| (*noop).clone()))
}

/// `use_child` plus binding `element` to the returned reference callback.
pub fn use_child_element<R, D>(
    element: R,
    data: Option<D>,
    options: ChildOptions<R, D>,
) -> Result<(), ChildrenError>
where
    R: Clone + PartialEq + 'static,
    D: Clone + PartialEq + 'static,
{
    let node_ref = use_child(data, options)?;
    bind_node_ref(element, &node_ref);
    Ok(())
}

/// Imperative access to one registration.
pub struct ChildController<R: 'static, D: 'static> {
    state: Shared<R, D>,
}

impl<R, D> ChildController<R, D>
where
    R: Clone + 'static,
    D: Clone + PartialEq + 'static,
{
    /// Publishes `data` if it differs from what was last published.
    pub fn set_data(&self, data: Option<D>) {
        let handle = {
            let mut s = self.state.borrow_mut();
            if s.last_data == data {
                return;
            }
            s.last_data = data.clone();
            s.handle.as_ref().map(ChildHandle::share)
        };
        if let Some(handle) = handle {
            handle.update_data(data);
        }
    }

    pub fn set_ref(&self, node_ref: Option<R>) {
        let handle = self.state.borrow().handle.as_ref().map(ChildHandle::share);
        if let Some(handle) = handle {
            handle.set_ref(node_ref);
        }
    }

    /// `None` when composed without a provider under `optional`.
    pub fn key(&self) -> Option<ChildKey> {
        self.state.borrow().handle.as_ref().map(ChildHandle::key)
    }

    pub fn is_registered(&self) -> bool {
        self.state.borrow().handle.is_some()
    }
}

impl<R: 'static, D: 'static> Clone for ChildController<R, D> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

/// Registers like `use_child`, but data is published by calling
/// `ChildController::set_data` rather than passed on every evaluation.
pub fn use_child_controller<R, D>(
    options: ChildOptions<R, D>,
) -> Result<ChildController<R, D>, ChildrenError>
where
    R: Clone + 'static,
    D: Clone + PartialEq + 'static,
{
    let state = register_child(None, false, options)?;
    Ok(ChildController { state })
}
