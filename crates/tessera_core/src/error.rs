//! # Registry Error Types
//!
//! Recoverable failures reported by the checked (`try_*`) registry API.
//! The unchecked API panics on the same conditions.

use thiserror::Error;

use crate::ecs::Entity;

/// Errors that can occur when operating on a registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The entity was never issued, has been destroyed, or is the null entity.
    #[error("entity {0} is not alive")]
    InvalidEntity(Entity),

    /// The entity does not carry the requested component.
    #[error("entity {entity} has no `{component}` component")]
    MissingComponent {
        /// The entity that was queried.
        entity: Entity,
        /// Type name of the missing component.
        component: &'static str,
    },

    /// The entity already carries a component of this type.
    #[error("entity {entity} already has a `{component}` component")]
    DuplicateComponent {
        /// The entity that was targeted.
        entity: Entity,
        /// Type name of the duplicated component.
        component: &'static str,
    },

    /// Requested entity capacity does not fit the 32-bit slot space.
    #[error("entity capacity {requested} exceeds the slot space of {max}")]
    CapacityOverflow {
        /// Capacity that was requested.
        requested: usize,
        /// Largest capacity a registry can address.
        max: usize,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
