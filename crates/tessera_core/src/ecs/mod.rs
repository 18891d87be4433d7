//! # Entity Component System
//!
//! A sparse-set ECS registry.
//!
//! ## Design Philosophy
//!
//! - Every component type lives in its own sparse set; add, remove and lookup
//!   are O(1)
//! - Entity IDs are slot indices with generation counters
//! - The component set is fixed at compile time; no runtime type maps and no
//!   dynamic dispatch over stores

mod component;
mod entity;
mod handle;
mod registry;
mod storage;
mod view;

pub use component::{Callback, ComponentPool, ComponentSet, Contains};
pub use entity::{Entity, EntityAllocator};
pub use handle::Handle;
pub use registry::Registry;
pub use storage::SparseSet;
pub use view::{CloneQuery, Query, View};
