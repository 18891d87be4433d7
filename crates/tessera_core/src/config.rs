//! # Registry Configuration
//!
//! Up-front sizing for a [`Registry`](crate::Registry). Capacities are hints:
//! storage still grows on demand past them.
//!
//! With the `serde` feature enabled the config can be read from a host
//! application's TOML or JSON file. Missing fields take their defaults.
//!
//! ```toml
//! entity_capacity = 100000
//! component_capacity = 4096
//! ```

use crate::error::{RegistryError, RegistryResult};

/// Default number of entity slots reserved up front.
pub const DEFAULT_ENTITY_CAPACITY: usize = 1024;

/// Default number of components reserved per declared type.
pub const DEFAULT_COMPONENT_CAPACITY: usize = 256;

/// Largest number of entities a registry can address.
///
/// Slot `u32::MAX` is never issued, so the null entity stays unique.
pub const MAX_ENTITIES: usize = u32::MAX as usize;

/// Sizing hints applied when a registry is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegistryConfig {
    /// Entity slots to reserve.
    pub entity_capacity: usize,
    /// Components to reserve in every pool.
    pub component_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            entity_capacity: DEFAULT_ENTITY_CAPACITY,
            component_capacity: DEFAULT_COMPONENT_CAPACITY,
        }
    }
}

impl RegistryConfig {
    /// A config that reserves nothing; every store grows on first use.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entity_capacity: 0,
            component_capacity: 0,
        }
    }

    /// Sets the number of entity slots to reserve.
    #[must_use]
    pub const fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    /// Sets the number of components to reserve per type.
    #[must_use]
    pub const fn with_component_capacity(mut self, capacity: usize) -> Self {
        self.component_capacity = capacity;
        self
    }

    /// Checks the config against the slot space.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CapacityOverflow`] if either capacity exceeds
    /// [`MAX_ENTITIES`].
    pub fn validate(&self) -> RegistryResult<()> {
        let requested = self.entity_capacity.max(self.component_capacity);
        if requested > MAX_ENTITIES {
            return Err(RegistryError::CapacityOverflow {
                requested,
                max: MAX_ENTITIES,
            });
        }
        Ok(())
    }
}
