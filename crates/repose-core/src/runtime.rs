use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::scope::{Scope, current_scope};

thread_local! {
    pub static COMPOSER: RefCell<Composer> = RefCell::new(Composer::default());
    static PASS_DEPTH: Cell<usize> = const { Cell::new(0) };
    static POST_EFFECTS: RefCell<Vec<Box<dyn FnOnce()>>> = RefCell::new(Vec::new());
}

/// Fallback slot table used by `remember` outside of any scope.
#[derive(Default)]
pub struct Composer {
    pub slots: Vec<Box<dyn Any>>,
    pub cursor: usize,
    pub keyed_slots: HashMap<String, Box<dyn Any>>,
}

/// Marks a compose pass as running. Post effects flush when the outermost
/// guard drops.
pub struct ComposeGuard {
    _private: (),
}

impl ComposeGuard {
    pub fn begin() -> Self {
        let depth = PASS_DEPTH.with(|d| {
            let depth = d.get();
            d.set(depth + 1);
            depth
        });
        if depth == 0 {
            COMPOSER.with(|c| c.borrow_mut().cursor = 0);
        }
        ComposeGuard { _private: () }
    }
}

impl Drop for ComposeGuard {
    fn drop(&mut self) {
        let depth = PASS_DEPTH.with(|d| {
            let depth = d.get().saturating_sub(1);
            d.set(depth);
            depth
        });
        if depth == 0 && !std::thread::panicking() {
            flush_post_effects();
        }
    }
}

/// Runs one compose pass with `root` as the root component.
///
/// Effects queued with `post_effect` during the pass run after `content`
/// returned and after unvisited keyed children were unmounted.
pub fn compose<R>(root: &Scope, content: impl FnOnce() -> R) -> R {
    let guard = ComposeGuard::begin();
    let out = root.run(content);
    drop(guard);
    out
}

pub fn is_composing() -> bool {
    PASS_DEPTH.with(|d| d.get() > 0)
}

/// Queues `f` for the end of the current compose pass. Outside a pass it runs
/// immediately.
pub fn post_effect(f: impl FnOnce() + 'static) {
    if is_composing() {
        POST_EFFECTS.with(|q| q.borrow_mut().push(Box::new(f)));
    } else {
        f();
    }
}

fn flush_post_effects() {
    // Effects may queue more effects; drain until empty.
    loop {
        let batch = POST_EFFECTS.with(|q| std::mem::take(&mut *q.borrow_mut()));
        if batch.is_empty() {
            break;
        }
        for f in batch {
            f();
        }
    }
}

/// Evaluates `content` as the keyed child `key` of the current scope.
///
/// Keyed children keep their remembered state when siblings move around, and
/// are unmounted when their parent stops requesting them.
pub fn keyed<R>(key: impl Into<String>, content: impl FnOnce() -> R) -> R {
    match current_scope() {
        Some(parent) => parent.keyed_child(key).run(content),
        None => {
            let key = key.into();
            log::warn!("keyed: '{key}' composed outside of a scope; state will not persist.");
            Scope::new().run(content)
        }
    }
}

/// Slot-based remember (sequential composition only)
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    if let Some(scope) = current_scope() {
        return scope.next_slot(init);
    }

    let existing = COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let cursor = c.cursor;
        c.cursor += 1;
        match c.slots.get(cursor) {
            Some(slot) => match slot.downcast_ref::<Rc<T>>() {
                Some(rc) => Ok(rc.clone()),
                None => {
                    log::warn!(
                        "remember: slot {} type changed; replacing. \
                         If this is due to conditional composition, prefer remember_with_key.",
                        cursor
                    );
                    Err(Some(cursor))
                }
            },
            None => Err(None),
        }
    });

    match existing {
        Ok(rc) => rc,
        Err(replace_at) => {
            let rc: Rc<T> = Rc::new(init());
            COMPOSER.with(|c| {
                let mut c = c.borrow_mut();
                match replace_at {
                    Some(i) => c.slots[i] = Box::new(rc.clone()),
                    None => c.slots.push(Box::new(rc.clone())),
                }
            });
            rc
        }
    }
}

/// Key-based remember
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    let key = key.into();
    if let Some(scope) = current_scope() {
        return scope.keyed_slot(key, init);
    }

    let existing = COMPOSER.with(|c| {
        let c = c.borrow();
        let existing = c.keyed_slots.get(&key)?;
        let rc = existing.downcast_ref::<Rc<T>>();
        if rc.is_none() {
            log::warn!(
                "remember_with_key: key '{}' reused with a different type; replacing.",
                key
            );
        }
        rc.cloned()
    });
    if let Some(rc) = existing {
        return rc;
    }

    let rc: Rc<T> = Rc::new(init());
    COMPOSER.with(|c| {
        c.borrow_mut()
            .keyed_slots
            .insert(key, Box::new(rc.clone()))
    });
    rc
}

pub fn remember_state<T: 'static>(init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    remember(|| RefCell::new(init()))
}

pub fn remember_state_with_key<T: 'static>(
    key: impl Into<String>,
    init: impl FnOnce() -> T,
) -> Rc<RefCell<T>> {
    remember_with_key(key, || RefCell::new(init()))
}
