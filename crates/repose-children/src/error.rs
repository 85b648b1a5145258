use thiserror::Error;

/// Misconfiguration of the child-tracking components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChildrenError {
    #[error("use_child must be used within a ChildrenProvider")]
    MissingProvider,
    #[error("use_resync must be used within a ChildrenProvider")]
    MissingResyncProvider,
    #[error(
        "ChildrenProvider was given both a registry and on_add/on_update/on_remove callbacks; \
         attach the callbacks to the registry instead"
    )]
    ConflictingTracking,
}
