use std::cell::RefCell;

use repose_core::{is_composing, post_effect, remember};
use smallvec::SmallVec;

use crate::context::{ChildrenLocal, default_children_local};
use crate::error::ChildrenError;

/// Options for `use_resync`.
pub struct ResyncOptions<R: 'static, D: 'static> {
    pub context: Option<ChildrenLocal<R, D>>,
    /// Skip the resync on the first evaluation. Defaults to `true`.
    pub ignore_initial: bool,
}

impl<R: 'static, D: 'static> ResyncOptions<R, D> {
    pub fn new() -> Self {
        Self {
            context: None,
            ignore_initial: true,
        }
    }

    pub fn context(mut self, local: ChildrenLocal<R, D>) -> Self {
        self.context = Some(local);
        self
    }

    pub fn ignore_initial(mut self, ignore_initial: bool) -> Self {
        self.ignore_initial = ignore_initial;
        self
    }
}

impl<R: 'static, D: 'static> Default for ResyncOptions<R, D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Asks the provider to re-announce its children whenever `deps` changes.
///
/// Use this when siblings are reordered without being remounted, e.g. keyed
/// children composed in a new order: the registry only learns about order from
/// registrations and cannot notice such a move by itself. The resync runs once
/// the current compose pass has finished, so it sees the new order. Call it
/// from inside `compose`: outside a pass the resync would run immediately,
/// before the children have been evaluated, and is logged as a warning.
///
/// Returns whether a resync was scheduled.
pub fn use_resync<R, D, K>(deps: &[K], options: ResyncOptions<R, D>) -> Result<bool, ChildrenError>
where
    R: Clone + 'static,
    D: Clone + 'static,
    K: PartialEq + Clone + 'static,
{
    let local = options.context.unwrap_or_else(default_children_local);
    let Some(ctx) = local.current() else {
        return Err(ChildrenError::MissingResyncProvider);
    };

    let last = remember(|| RefCell::new(None::<SmallVec<[K; 4]>>));
    let schedule = {
        let mut last = last.borrow_mut();
        let first = last.is_none();
        if last.as_deref() == Some(deps) {
            false
        } else {
            *last = Some(deps.iter().cloned().collect());
            !(first && options.ignore_initial)
        }
    };

    if schedule {
        if !is_composing() {
            log::warn!(
                "children: resync for {:?} requested outside a compose pass; announcing the current order",
                ctx.id()
            );
        }
        log::debug!("children: resync scheduled for {:?}", ctx.id());
        post_effect(move || ctx.update());
    }
    Ok(schedule)
}
