//! # Child tracking
//!
//! Lets descendants register themselves, in composition order, with an
//! ancestor, no matter how many wrapper components sit in between. Useful for
//! toolbars, tab lists or sortable collections where the ancestor needs the
//! native elements of its children.
//!
//! - `ChildrenProvider` — the coordinator. Owns (or is given) a
//!   `ChildRegistry` and provides a `ChildrenContext` to its subtree.
//! - `use_child` / `use_child_element` / `use_child_controller` — called by a
//!   descendant to add its record, keep its data current and remove it on
//!   unmount.
//! - `use_resync` — called under the provider to re-announce order after
//!   children were moved without being remounted.
//!
//! ```rust
//! use repose_children::*;
//! use repose_core::*;
//!
//! let registry = ChildRegistry::<u32, String>::new();
//! let root = Scope::new();
//!
//! compose(&root, || {
//!     ChildrenProvider(ChildTracking::new().registry(registry.clone()), || {
//!         for (id, label) in [(1u32, "Hi"), (2u32, "Ho")] {
//!             keyed(label, || {
//!                 use_child_element(id, Some(label.to_string()), ChildOptions::new())
//!             })?;
//!         }
//!         Ok::<_, ChildrenError>(())
//!     })?
//! })?;
//!
//! let refs: Vec<_> = registry.snapshot().into_iter().map(|c| c.node_ref).collect();
//! assert_eq!(refs, vec![Some(1), Some(2)]);
//!
//! root.dispose();
//! assert!(registry.is_empty());
//! # Ok::<(), ChildrenError>(())
//! ```

pub mod child;
pub mod context;
pub mod error;
pub mod provider;
pub mod registry;
pub mod resync;
mod tests;

pub use child::{ChildController, ChildOptions, use_child, use_child_controller, use_child_element};
pub use context::{ChildHandle, ChildrenContext, ChildrenLocal, ContextId, default_children_local};
pub use error::ChildrenError;
pub use provider::{ChildTracking, ChildrenProvider};
pub use registry::{
    ChildKey, ChildRecord, ChildRegistry, ChildrenHooks, OnAdd, OnRemove, OnUpdate,
    remember_registry,
};
pub use resync::{ResyncOptions, use_resync};
