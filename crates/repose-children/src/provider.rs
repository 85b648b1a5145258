use std::cell::RefCell;

use repose_core::remember;

use crate::context::{ChildrenContext, ChildrenLocal, default_children_local};
use crate::error::ChildrenError;
use crate::registry::{ChildRecord, ChildRegistry, ChildrenHooks};

/// How a `ChildrenProvider` tracks its descendants: either an external
/// registry that already carries its observers, or inline observers attached
/// to a registry the provider owns. Not both.
pub struct ChildTracking<R: 'static, D: 'static> {
    registry: Option<ChildRegistry<R, D>>,
    hooks: ChildrenHooks<R, D>,
    context: Option<ChildrenLocal<R, D>>,
}

impl<R: Clone + 'static, D: Clone + 'static> ChildTracking<R, D> {
    pub fn new() -> Self {
        Self {
            registry: None,
            hooks: ChildrenHooks::new(),
            context: None,
        }
    }

    pub fn registry(mut self, registry: ChildRegistry<R, D>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Inline observers, replacing any set before.
    pub fn hooks(mut self, hooks: ChildrenHooks<R, D>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn on_add(mut self, f: impl Fn(&ChildRecord<R, D>) + 'static) -> Self {
        self.hooks = self.hooks.on_add(f);
        self
    }

    pub fn on_update(mut self, f: impl Fn(usize, &ChildRecord<R, D>) + 'static) -> Self {
        self.hooks = self.hooks.on_update(f);
        self
    }

    pub fn on_remove(mut self, f: impl Fn(usize) + 'static) -> Self {
        self.hooks = self.hooks.on_remove(f);
        self
    }

    /// Provide through `local` instead of the default binding, so this
    /// provider does not shadow another one higher up.
    pub fn context(mut self, local: ChildrenLocal<R, D>) -> Self {
        self.context = Some(local);
        self
    }
}

impl<R: Clone + 'static, D: Clone + 'static> Default for ChildTracking<R, D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Coordinator component: composes `content` with a children context bound.
///
/// The context value, and the registry it owns when no external one is given,
/// keep their identity across evaluations, so re-composing the provider does
/// not make descendants register again. Inline observers are rebound on every
/// evaluation.
#[allow(non_snake_case)]
pub fn ChildrenProvider<R, D, T>(
    tracking: ChildTracking<R, D>,
    content: impl FnOnce() -> T,
) -> Result<T, ChildrenError>
where
    R: Clone + 'static,
    D: Clone + 'static,
{
    let ChildTracking {
        registry,
        hooks,
        context,
    } = tracking;
    if registry.is_some() && !hooks.is_empty() {
        return Err(ChildrenError::ConflictingTracking);
    }

    // Taken even when an external registry is given, so the slots after it
    // keep their positions if the caller switches between the two.
    let owned = remember(ChildRegistry::<R, D>::new);
    let registry = match registry {
        Some(external) => external,
        None => {
            owned.set_hooks(hooks);
            (*owned).clone()
        }
    };

    let slot = remember(|| RefCell::new(None::<ChildrenContext<R, D>>));
    let current = slot
        .borrow()
        .as_ref()
        .filter(|ctx| ctx.registry().ptr_eq(&registry))
        .cloned();
    let ctx = match current {
        Some(ctx) => ctx,
        None => {
            // A different external registry means a new context value, so
            // descendants register again with it.
            let ctx = ChildrenContext::new(registry);
            log::debug!("children: provider bound {:?}", ctx.id());
            *slot.borrow_mut() = Some(ctx.clone());
            ctx
        }
    };
    ctx.begin_pass();

    let local = context.unwrap_or_else(default_children_local);
    Ok(local.provide(ctx, content))
}
