//! # Tessera Core
//!
//! An in-memory entity/component registry built on sparse sets:
//! - O(1) add, remove and lookup per component
//! - Generation-checked entity IDs with FIFO slot recycling
//! - Filtered views driven by the first queried component's pool
//!
//! ## Architecture Rules
//!
//! 1. **Compile-time component sets** - declared with [`component_set!`]
//! 2. **Dense storage** - components are packed in contiguous arrays
//! 3. **Single writer** - mutation needs `&mut Registry`, iteration `&Registry`
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::{component_set, Registry};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! pub struct Position(f32);
//! #[derive(Debug, Clone, PartialEq)]
//! pub struct Velocity(f32);
//!
//! component_set! {
//!     pub struct Physics {
//!         positions: Position,
//!         velocities: Velocity,
//!     }
//! }
//!
//! let mut registry = Registry::<Physics>::new();
//! let e = registry.create();
//! registry.add(e, Position(0.0));
//! registry.add(e, Velocity(2.0));
//!
//! let moving: Vec<_> = registry.view::<(Velocity, Position)>().collect();
//! for entity in moving {
//!     let dx = registry.get::<Velocity>(entity).0;
//!     registry.get_mut::<Position>(entity).0 += dx;
//! }
//! assert_eq!(registry.get::<Position>(e), &Position(2.0));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::RegistryConfig;
pub use ecs::{
    Callback, CloneQuery, ComponentPool, ComponentSet, Contains, Entity, EntityAllocator, Handle,
    Query, Registry, SparseSet, View,
};
pub use error::{RegistryError, RegistryResult};
