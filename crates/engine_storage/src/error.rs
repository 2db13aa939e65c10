//! Storage error types.

use crate::entity::Entity;

/// Errors returned by pool and registry operations.
///
/// Every variant signals a broken caller contract (double add, removing
/// something that is not there). None of them are transient.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The entity already owns a component of this type.
    #[error("{entity} already has a {component} component")]
    DuplicateComponent {
        /// The entity that was targeted.
        entity: Entity,
        /// Name of the component type.
        component: &'static str,
    },

    /// The targeted pool does not store a component for the entity.
    #[error("{entity} has no {component} component")]
    EntityNotFound {
        /// The entity that was targeted.
        entity: Entity,
        /// Name of the component type.
        component: &'static str,
    },

    /// No pool has ever been created for this component type.
    #[error("no pool exists for component {component}")]
    ComponentPoolNotFound {
        /// Name of the component type.
        component: &'static str,
    },
}

/// Convenience alias for storage results.
pub type Result<T> = std::result::Result<T, StorageError>;
