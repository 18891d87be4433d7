//! # Component System
//!
//! Components are plain values attached to entities. Each component type gets
//! its own [`ComponentPool`]: a [`SparseSet`] keyed by entity slot plus the
//! listeners notified when a value is added or removed.
//!
//! The set of component types a registry manages is fixed when the registry
//! type is declared, via [`component_set!`](crate::component_set). Access to
//! an undeclared type fails the [`Contains`] bound at compile time.

use super::entity::Entity;
use super::storage::SparseSet;

/// Listener invoked with an entity and one of its components.
pub type Callback<T> = Box<dyn FnMut(Entity, &T)>;

/// Storage and listeners for a single component type.
pub struct ComponentPool<T> {
    storage: SparseSet<T>,
    on_add: Vec<Callback<T>>,
    on_remove: Vec<Callback<T>>,
}

impl<T> Default for ComponentPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ComponentPool<T> {
    /// Creates an empty pool with no listeners.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            storage: SparseSet::new(),
            on_add: Vec::new(),
            on_remove: Vec::new(),
        }
    }

    /// The underlying sparse set.
    #[inline]
    #[must_use]
    pub fn storage(&self) -> &SparseSet<T> {
        &self.storage
    }

    /// Number of entities carrying this component.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns `true` if no entity carries this component.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Returns `true` if `entity`'s slot carries this component.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.storage.has(entity.slot())
    }

    /// Returns the component stored for `entity`'s slot.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.storage.get(entity.slot())
    }

    /// Returns the component stored for `entity`'s slot, mutably.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.storage.get_mut(entity.slot())
    }

    /// Registers a listener fired after a component is inserted.
    pub fn on_add(&mut self, callback: Callback<T>) {
        self.on_add.push(callback);
    }

    /// Registers a listener fired before a component is removed.
    pub fn on_remove(&mut self, callback: Callback<T>) {
        self.on_remove.push(callback);
    }

    /// Inserts the value built by `make`, then notifies `on_add` listeners in
    /// registration order.
    ///
    /// # Panics
    ///
    /// Panics if the slot already carries this component.
    pub fn insert_with<F>(&mut self, entity: Entity, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        let value = self.storage.insert_with(entity.slot(), make);
        for callback in &mut self.on_add {
            callback(entity, &*value);
        }
        value
    }

    /// Inserts `value`, then notifies `on_add` listeners.
    ///
    /// # Panics
    ///
    /// Panics if the slot already carries this component.
    pub fn insert(&mut self, entity: Entity, value: T) -> &mut T {
        self.insert_with(entity, || value)
    }

    /// Notifies `on_remove` listeners, then removes the component.
    ///
    /// Returns `None` without notifying anyone if there is nothing to remove.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let value = self.storage.get(entity.slot())?;
        for callback in &mut self.on_remove {
            callback(entity, value);
        }
        self.storage.take(entity.slot())
    }

    /// Returns the component stored for `entity`'s slot, inserting the value
    /// built by `make` if there is none.
    ///
    /// `on_add` listeners fire only when a value is inserted.
    pub fn get_or_insert_with<F>(&mut self, entity: Entity, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        let mut inserted = false;
        let value = self.storage.get_or_insert_with(entity.slot(), || {
            inserted = true;
            make()
        });
        if inserted {
            for callback in &mut self.on_add {
                callback(entity, &*value);
            }
        }
        value
    }

    /// Mutably visits every stored component together with its slot index.
    pub fn for_each_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(usize, &mut T),
    {
        for (index, value) in self.storage.iter_mut() {
            visit(index, value);
        }
    }

    /// Reserves room for `additional` more components.
    pub fn reserve(&mut self, additional: usize) {
        self.storage.reserve(additional);
    }

    /// Drops every component without notifying listeners.
    pub fn clear(&mut self) {
        self.storage.clear();
    }
}

/// A fixed set of component pools, one per declared component type.
///
/// Implemented by [`component_set!`](crate::component_set); the methods fan
/// out over every declared type.
pub trait ComponentSet: Default + 'static {
    /// Tuple of every declared component type, in declaration order.
    type Types;

    /// Names of the declared component types, in declaration order.
    const NAMES: &'static [&'static str];

    /// Removes every component of `entity`, notifying `on_remove` listeners.
    fn remove_all(&mut self, entity: Entity);

    /// Drops every component of every type without notifying listeners.
    fn clear(&mut self);

    /// Reserves room for `additional` more components in every pool.
    fn reserve(&mut self, additional: usize);

    /// Number of declared types `entity` currently carries.
    fn component_count(&self, entity: Entity) -> usize;
}

/// Compile-time proof that a component set declares `T`.
pub trait Contains<T: 'static>: ComponentSet {
    /// The pool holding every `T`.
    fn pool(&self) -> &ComponentPool<T>;

    /// The pool holding every `T`, mutably.
    fn pool_mut(&mut self) -> &mut ComponentPool<T>;
}

/// Declares a fixed set of component types for a [`Registry`](crate::Registry).
///
/// Each `field: Type` line creates one [`ComponentPool`]. A type may appear
/// only once; listing it twice is rejected by the compiler.
///
/// The component types are exposed through [`ComponentSet::Types`], so a
/// `pub` set requires every listed type to be at least as visible.
///
/// ```rust
/// use tessera_core::{component_set, Registry};
///
/// #[derive(Debug, PartialEq)]
/// pub struct Position(f32, f32);
/// pub struct Frozen;
///
/// component_set! {
///     /// Components of the demo world.
///     pub struct Demo {
///         positions: Position,
///         frozen: Frozen,
///     }
/// }
///
/// let mut registry = Registry::<Demo>::new();
/// let e = registry.create();
/// registry.add(e, Position(1.0, 2.0));
/// assert_eq!(registry.get::<Position>(e), &Position(1.0, 2.0));
/// assert!(!registry.has::<Frozen>(e));
/// ```
#[macro_export]
macro_rules! component_set {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($field: $crate::ecs::ComponentPool<$ty>,)*
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                Self {
                    $($field: $crate::ecs::ComponentPool::new(),)*
                }
            }
        }

        impl $crate::ecs::ComponentSet for $name {
            type Types = ($($ty,)*);

            const NAMES: &'static [&'static str] = &[$(::core::stringify!($ty)),*];

            fn remove_all(&mut self, entity: $crate::ecs::Entity) {
                $(self.$field.remove(entity);)*
                let _ = entity;
            }

            fn clear(&mut self) {
                $(self.$field.clear();)*
            }

            fn reserve(&mut self, additional: usize) {
                $(self.$field.reserve(additional);)*
                let _ = additional;
            }

            fn component_count(&self, entity: $crate::ecs::Entity) -> usize {
                let _ = entity;
                0 $(+ usize::from(self.$field.contains(entity)))*
            }
        }

        $(
            impl $crate::ecs::Contains<$ty> for $name {
                #[inline]
                fn pool(&self) -> &$crate::ecs::ComponentPool<$ty> {
                    &self.$field
                }

                #[inline]
                fn pool_mut(&mut self) -> &mut $crate::ecs::ComponentPool<$ty> {
                    &mut self.$field
                }
            }
        )*
    };
}
