//! # Composition locals
//!
//! Repose passes ambient values down a composition through thread‑local
//! “composition locals” instead of threading them through every function.
//!
//! A `CompositionLocal<T>` is a typed key. A value bound with `provide` is
//! visible to everything composed inside the closure, and the innermost binding
//! wins:
//!
//! ```rust
//! use repose_core::*;
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct Accent(&'static str);
//!
//! let accent = CompositionLocal::<Accent>::shared();
//! assert_eq!(accent.current(), None);
//!
//! accent.provide(Accent("green"), || {
//!     assert_eq!(accent.current(), Some(Accent("green")));
//!     accent.provide(Accent("red"), || {
//!         assert_eq!(accent.current(), Some(Accent("red")));
//!     });
//! });
//! ```
//!
//! `shared()` is the default binding for a type: every call returns the same
//! key. `new()` allocates a fresh, independent key, so two unrelated subtrees
//! can provide values of the same type without seeing each other.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum LocalId {
    Type(TypeId),
    Unique(u64),
}

static NEXT_LOCAL: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static LOCALS_STACK: RefCell<Vec<HashMap<LocalId, Box<dyn Any>>>> = RefCell::new(Vec::new());
}

/// Typed key for a value provided to a subtree.
pub struct CompositionLocal<T: 'static> {
    id: LocalId,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> CompositionLocal<T> {
    /// The default binding for `T`.
    pub fn shared() -> Self {
        Self {
            id: LocalId::Type(TypeId::of::<T>()),
            _marker: PhantomData,
        }
    }

    /// A binding distinct from `shared()` and from every other `new()`.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            id: LocalId::Unique(NEXT_LOCAL.fetch_add(1, Ordering::Relaxed)),
            _marker: PhantomData,
        }
    }

    /// Binds `value` for everything composed inside `f`.
    pub fn provide<R>(&self, value: T, f: impl FnOnce() -> R) -> R {
        with_locals_frame(|| {
            set_local_boxed(self.id, Box::new(value));
            f()
        })
    }

    /// Innermost value bound for this key, if any.
    pub fn current(&self) -> Option<T>
    where
        T: Clone,
    {
        LOCALS_STACK.with(|st| {
            for frame in st.borrow().iter().rev() {
                if let Some(v) = frame.get(&self.id)
                    && let Some(t) = v.downcast_ref::<T>()
                {
                    return Some(t.clone());
                }
            }
            None
        })
    }

    pub fn is_provided(&self) -> bool {
        LOCALS_STACK.with(|st| st.borrow().iter().any(|frame| frame.contains_key(&self.id)))
    }
}

impl<T: 'static> Clone for CompositionLocal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for CompositionLocal<T> {}

impl<T: 'static> PartialEq for CompositionLocal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: 'static> Eq for CompositionLocal<T> {}

impl<T: 'static> fmt::Debug for CompositionLocal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            LocalId::Type(_) => write!(f, "CompositionLocal<{}>(shared)", std::any::type_name::<T>()),
            LocalId::Unique(n) => write!(f, "CompositionLocal<{}>(#{n})", std::any::type_name::<T>()),
        }
    }
}

fn with_locals_frame<R>(f: impl FnOnce() -> R) -> R {
    // Non-panicking frame guard (ensures pop on unwind)
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            LOCALS_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }
    LOCALS_STACK.with(|st| st.borrow_mut().push(HashMap::new()));
    let _guard = Guard;
    f()
}

fn set_local_boxed(id: LocalId, v: Box<dyn Any>) {
    LOCALS_STACK.with(|st| {
        let mut st = st.borrow_mut();
        if let Some(top) = st.last_mut() {
            top.insert(id, v);
        } else {
            // no frame: create a temporary one
            let mut m = HashMap::new();
            m.insert(id, v);
            st.push(m);
        }
    });
}
