pub use crate::effects::{Dispose, effect, on_unmount};
pub use crate::effects_ext::{bind_node_ref, disposable_effect};
pub use crate::locals::CompositionLocal;
pub use crate::node_ref::NodeRef;
pub use crate::runtime::{
    ComposeGuard, compose, is_composing, keyed, post_effect, remember, remember_state,
    remember_state_with_key, remember_with_key,
};
pub use crate::scope::{Scope, current_scope, scoped_effect};
