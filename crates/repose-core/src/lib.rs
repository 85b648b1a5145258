//! # Composition runtime
//!
//! The parts of Repose that every component relies on, without any widgets:
//!
//! - `Scope` — one mounted component instance and its subtree.
//! - `remember*` — lifecycle‑aware storage bound to the current scope.
//! - `effect` / `scoped_effect` / `disposable_effect` — side‑effects with cleanup.
//! - `compose` / `post_effect` — a render pass and the effects that run after it.
//! - `CompositionLocal` — values provided to a subtree.
//! - `NodeRef` / `bind_node_ref` — reference callbacks for native elements.
//!
//! ## Remembered state
//!
//! UI state is held in `remember_*` slots of the current scope:
//!
//! ```rust
//! use repose_core::*;
//!
//! let root = Scope::new();
//! let render = || {
//!     compose(&root, || {
//!         let count = remember_state(|| 0);
//!         *count.borrow_mut() += 1;
//!         let n = *count.borrow();
//!         n
//!     })
//! };
//!
//! assert_eq!(render(), 1);
//! assert_eq!(render(), 2);
//! ```
//!
//! - `remember` and `remember_state` are order‑based: the Nth call in a
//!   scope always refers to the Nth stored value.
//! - `remember_with_key` and `remember_state_with_key` are key‑based and more
//!   stable across conditional branches.
//!
//! ## Keyed children
//!
//! `keyed(key, || ...)` composes a child component whose state follows the key
//! rather than its position. A keyed child that is not composed again during its
//! parent's next pass is unmounted, and its cleanups run.
//!
//! ## Effects and cleanup
//!
//! ```rust
//! use repose_core::*;
//!
//! let root = Scope::new();
//! compose(&root, || {
//!     scoped_effect(|| {
//!         println!("mounted");
//!         Box::new(|| println!("unmounted"))
//!     });
//! });
//! root.dispose();
//! ```
//!
//! Cleanups of one scope run in reverse order of installation, after every
//! child scope has been disposed.

pub mod effects;
pub mod effects_ext;
pub mod locals;
pub mod node_ref;
pub mod prelude;
pub mod runtime;
pub mod scope;

pub use effects::*;
pub use effects_ext::*;
pub use locals::*;
pub use node_ref::*;
pub use prelude::*;
pub use runtime::*;
