//! # Registry
//!
//! The central container for all entities and components.
//!
//! A registry is parameterised by a [`ComponentSet`] declared with
//! [`component_set!`](crate::component_set). Every per-type operation is
//! bounded by `S: Contains<T>`, so touching an undeclared component type is a
//! compile error rather than a runtime lookup miss.
//!
//! ## Preconditions
//!
//! Mutating operations `assert!` that the entity is alive. Read-only lookups
//! only `debug_assert!` it; use the `try_*` variants when the entity comes
//! from an untrusted source.

use std::any::type_name;
use std::fmt;

use tracing::{debug, trace};

use super::component::{ComponentPool, ComponentSet, Contains};
use super::entity::{Entity, EntityAllocator};
use super::handle::Handle;
use super::view::{CloneQuery, Query, View};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};

/// Owns every entity and one component pool per declared component type.
///
/// # Example
///
/// ```rust
/// use tessera_core::{component_set, Registry};
///
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Health(u32);
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Poisoned;
///
/// component_set! {
///     pub struct Game {
///         health: Health,
///         poisoned: Poisoned,
///     }
/// }
///
/// let mut registry = Registry::<Game>::new();
/// let hero = registry.create();
/// registry.add(hero, Health(10));
/// registry.add(hero, Poisoned);
///
/// registry.each_mut::<Health, _>(|_, health| health.0 -= 1);
/// assert_eq!(registry.get::<Health>(hero), &Health(9));
///
/// let sick: Vec<_> = registry.view::<(Poisoned, Health)>().collect();
/// assert_eq!(sick, vec![hero]);
/// ```
pub struct Registry<S: ComponentSet> {
    pub(crate) entities: EntityAllocator,
    pub(crate) components: S,
}

impl<S: ComponentSet> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ComponentSet> fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entities", &self.entities.len())
            .field("retired", &self.entities.retired_len())
            .field("components", &S::NAMES)
            .finish()
    }
}

impl<S: ComponentSet> Registry<S> {
    /// Creates an empty registry. Nothing is allocated until first use.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            components: S::default(),
        }
    }

    /// Creates a registry with storage reserved per `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CapacityOverflow`] if a capacity exceeds the
    /// 32-bit slot space.
    pub fn with_config(config: RegistryConfig) -> RegistryResult<Self> {
        config.validate()?;
        let mut components = S::default();
        components.reserve(config.component_capacity);
        debug!(
            entity_capacity = config.entity_capacity,
            component_capacity = config.component_capacity,
            component_types = S::NAMES.len(),
            "registry configured"
        );
        Ok(Self {
            entities: EntityAllocator::with_capacity(config.entity_capacity),
            components,
        })
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Registers a listener fired after a `T` is added to any entity.
    ///
    /// Listeners fire in registration order and see the freshly stored value.
    pub fn on_add<T, F>(&mut self, listener: F)
    where
        S: Contains<T>,
        T: 'static,
        F: FnMut(Entity, &T) + 'static,
    {
        Contains::<T>::pool_mut(&mut self.components).on_add(Box::new(listener));
    }

    /// Registers a listener fired before a `T` is removed from any entity,
    /// including removals caused by [`destroy`](Self::destroy).
    ///
    /// [`clear`](Self::clear) does not notify listeners.
    pub fn on_remove<T, F>(&mut self, listener: F)
    where
        S: Contains<T>,
        T: 'static,
        F: FnMut(Entity, &T) + 'static,
    {
        Contains::<T>::pool_mut(&mut self.components).on_remove(Box::new(listener));
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Creates a new entity with no components.
    ///
    /// # Panics
    ///
    /// Panics if the 32-bit slot space is exhausted.
    pub fn create(&mut self) -> Entity {
        let entity = self.entities.allocate();
        trace!(%entity, "entity created");
        entity
    }

    /// Creates `count` entities.
    ///
    /// # Panics
    ///
    /// Panics if the 32-bit slot space is exhausted.
    pub fn create_many(&mut self, count: usize) -> Vec<Entity> {
        self.entities.reserve(count.saturating_sub(self.entities.retired_len()));
        (0..count).map(|_| self.create()).collect()
    }

    /// Creates a new entity and returns a handle to it.
    pub fn create_handle(&mut self) -> Handle<'_, S> {
        let entity = self.create();
        Handle::new(self, entity)
    }

    /// Wraps `entity` in a handle bound to this registry.
    pub fn handle(&mut self, entity: Entity) -> Handle<'_, S> {
        Handle::new(self, entity)
    }

    /// Returns `true` if `entity` is alive in this registry.
    ///
    /// False for [`Entity::NULL`] and for entities whose slot has been reused.
    #[inline]
    #[must_use]
    pub fn valid(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Destroys `entity`, removing every component first.
    ///
    /// `on_remove` listeners run while the components are still stored.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive.
    pub fn destroy(&mut self, entity: Entity) {
        assert!(self.valid(entity), "cannot destroy dead entity {entity}");
        self.components.remove_all(entity);
        self.entities.release(entity);
        trace!(%entity, "entity destroyed");
    }

    /// Destroys each entity in order.
    ///
    /// Not atomic: entities before an invalid one stay destroyed.
    ///
    /// # Panics
    ///
    /// Panics on the first entity that is not alive.
    pub fn destroy_many<I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = Entity>,
    {
        for entity in entities {
            self.destroy(entity);
        }
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entity is alive.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of destroyed entities waiting for their slot to be reused.
    #[inline]
    #[must_use]
    pub fn retired_len(&self) -> usize {
        self.entities.retired_len()
    }

    /// Returns the live entity occupying slot `index`.
    #[inline]
    #[must_use]
    pub fn entity_at(&self, index: u32) -> Option<Entity> {
        self.entities.get(index as usize)
    }

    /// Iterates over live entities in ascending slot order.
    ///
    /// Unlike [`all`](Self::all), the order does not depend on the history of
    /// destroyed entities.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// Drops every entity and component.
    ///
    /// Listeners are kept but not notified. Slot numbering restarts from
    /// zero, so entities obtained before the call must be discarded.
    pub fn clear(&mut self) {
        debug!(
            entities = self.entities.len(),
            retired = self.entities.retired_len(),
            "clearing registry"
        );
        self.components.clear();
        self.entities.clear();
    }

    // =========================================================================
    // Component operations
    // =========================================================================

    /// Adds `value` to `entity` and returns a reference to the stored copy.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive or already has a `T`.
    pub fn add<T>(&mut self, entity: Entity, value: T) -> &mut T
    where
        S: Contains<T>,
        T: 'static,
    {
        self.emplace(entity, || value)
    }

    /// Adds the value built by `make` to `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive or already has a `T`.
    pub fn emplace<T, F>(&mut self, entity: Entity, make: F) -> &mut T
    where
        S: Contains<T>,
        T: 'static,
        F: FnOnce() -> T,
    {
        assert!(self.valid(entity), "cannot add component to dead entity {entity}");
        let pool = Contains::<T>::pool_mut(&mut self.components);
        assert!(
            !pool.contains(entity),
            "entity {entity} already has a `{}` component",
            type_name::<T>()
        );
        pool.insert_with(entity, make)
    }

    /// Adds `T::default()` to `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive or already has a `T`.
    pub fn emplace_default<T>(&mut self, entity: Entity) -> &mut T
    where
        S: Contains<T>,
        T: Default + 'static,
    {
        self.emplace(entity, T::default)
    }

    /// Returns `entity`'s `T`, adding the value built by `make` if it has none.
    ///
    /// `on_add` listeners fire only when a value is added.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive.
    pub fn get_or_emplace<T, F>(&mut self, entity: Entity, make: F) -> &mut T
    where
        S: Contains<T>,
        T: 'static,
        F: FnOnce() -> T,
    {
        assert!(self.valid(entity), "cannot add component to dead entity {entity}");
        Contains::<T>::pool_mut(&mut self.components).get_or_insert_with(entity, make)
    }

    /// Removes and returns `entity`'s `T`, if it has one.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive.
    pub fn remove<T>(&mut self, entity: Entity) -> Option<T>
    where
        S: Contains<T>,
        T: 'static,
    {
        assert!(self.valid(entity), "cannot remove component from dead entity {entity}");
        Contains::<T>::pool_mut(&mut self.components).remove(entity)
    }

    /// Removes every component of `entity`, keeping the entity alive.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive.
    pub fn remove_all_components(&mut self, entity: Entity) {
        assert!(self.valid(entity), "cannot remove components from dead entity {entity}");
        self.components.remove_all(entity);
    }

    /// Returns `true` if `entity` has a `T`.
    #[inline]
    #[must_use]
    pub fn has<T>(&self, entity: Entity) -> bool
    where
        S: Contains<T>,
        T: 'static,
    {
        debug_assert!(self.valid(entity), "entity {entity} is not alive");
        self.pool::<T>().contains(entity)
    }

    /// Returns `true` if `entity` has every type in `Q`.
    #[inline]
    #[must_use]
    pub fn has_all<Q: Query<S>>(&self, entity: Entity) -> bool {
        debug_assert!(self.valid(entity), "entity {entity} is not alive");
        Q::has_all(&self.components, entity.slot())
    }

    /// Returns `true` if `entity` has at least one type in `Q`.
    #[inline]
    #[must_use]
    pub fn has_any<Q: Query<S>>(&self, entity: Entity) -> bool {
        debug_assert!(self.valid(entity), "entity {entity} is not alive");
        Q::has_any(&self.components, entity.slot())
    }

    /// Returns `entity`'s `T`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` has no `T`.
    #[must_use]
    pub fn get<T>(&self, entity: Entity) -> &T
    where
        S: Contains<T>,
        T: 'static,
    {
        self.get_if(entity).unwrap_or_else(|| missing::<T>(entity))
    }

    /// Returns `entity`'s `T`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `entity` has no `T`.
    pub fn get_mut<T>(&mut self, entity: Entity) -> &mut T
    where
        S: Contains<T>,
        T: 'static,
    {
        self.get_if_mut(entity).unwrap_or_else(|| missing::<T>(entity))
    }

    /// Returns `entity`'s `T`, if it has one.
    #[inline]
    #[must_use]
    pub fn get_if<T>(&self, entity: Entity) -> Option<&T>
    where
        S: Contains<T>,
        T: 'static,
    {
        debug_assert!(self.valid(entity), "entity {entity} is not alive");
        self.pool::<T>().get(entity)
    }

    /// Returns `entity`'s `T` mutably, if it has one.
    #[inline]
    pub fn get_if_mut<T>(&mut self, entity: Entity) -> Option<&mut T>
    where
        S: Contains<T>,
        T: 'static,
    {
        debug_assert!(self.valid(entity), "entity {entity} is not alive");
        Contains::<T>::pool_mut(&mut self.components).get_mut(entity)
    }

    /// Returns references to every component in `Q`, in tuple order.
    ///
    /// # Panics
    ///
    /// Panics if `entity` lacks one of the types.
    #[must_use]
    pub fn get_all<Q: Query<S>>(&self, entity: Entity) -> Q::Refs<'_> {
        debug_assert!(self.valid(entity), "entity {entity} is not alive");
        assert!(
            Q::has_all(&self.components, entity.slot()),
            "entity {entity} lacks a component of `{}`",
            type_name::<Q>()
        );
        Q::fetch(&self.components, entity.slot())
    }

    /// Number of entities that have a `T`.
    #[inline]
    #[must_use]
    pub fn count<T>(&self) -> usize
    where
        S: Contains<T>,
        T: 'static,
    {
        self.pool::<T>().len()
    }

    /// The pool storing every `T`.
    #[inline]
    #[must_use]
    pub fn pool<T>(&self) -> &ComponentPool<T>
    where
        S: Contains<T>,
        T: 'static,
    {
        Contains::<T>::pool(&self.components)
    }

    // =========================================================================
    // Checked operations
    // =========================================================================

    /// Adds `value` to `entity`, reporting precondition failures as errors.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidEntity`] if `entity` is not alive,
    /// [`RegistryError::DuplicateComponent`] if it already has a `T`.
    pub fn try_add<T>(&mut self, entity: Entity, value: T) -> RegistryResult<&mut T>
    where
        S: Contains<T>,
        T: 'static,
    {
        if !self.valid(entity) {
            return Err(RegistryError::InvalidEntity(entity));
        }
        if self.has::<T>(entity) {
            return Err(RegistryError::DuplicateComponent {
                entity,
                component: type_name::<T>(),
            });
        }
        Ok(self.add(entity, value))
    }

    /// Returns `entity`'s `T`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidEntity`] if `entity` is not alive,
    /// [`RegistryError::MissingComponent`] if it has no `T`.
    pub fn try_get<T>(&self, entity: Entity) -> RegistryResult<&T>
    where
        S: Contains<T>,
        T: 'static,
    {
        if !self.valid(entity) {
            return Err(RegistryError::InvalidEntity(entity));
        }
        self.pool::<T>().get(entity).ok_or(RegistryError::MissingComponent {
            entity,
            component: type_name::<T>(),
        })
    }

    /// Returns `entity`'s `T`, mutably.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidEntity`] if `entity` is not alive,
    /// [`RegistryError::MissingComponent`] if it has no `T`.
    pub fn try_get_mut<T>(&mut self, entity: Entity) -> RegistryResult<&mut T>
    where
        S: Contains<T>,
        T: 'static,
    {
        if !self.valid(entity) {
            return Err(RegistryError::InvalidEntity(entity));
        }
        Contains::<T>::pool_mut(&mut self.components)
            .get_mut(entity)
            .ok_or(RegistryError::MissingComponent {
                entity,
                component: type_name::<T>(),
            })
    }

    /// Destroys `entity`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidEntity`] if `entity` is not alive.
    pub fn try_destroy(&mut self, entity: Entity) -> RegistryResult<()> {
        if !self.valid(entity) {
            return Err(RegistryError::InvalidEntity(entity));
        }
        self.destroy(entity);
        Ok(())
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Lazily iterates the entities that have every type in `Q`.
    ///
    /// Iteration is driven by the first type's pool; list the rarest first.
    #[must_use]
    pub fn view<Q: Query<S>>(&self) -> View<'_, S, Q> {
        View::new(&self.entities, &self.components)
    }

    /// Lazily iterates every live entity.
    #[must_use]
    pub fn all(&self) -> View<'_, S, ()> {
        self.view::<()>()
    }

    /// Iterates matching entities together with their `Q` components.
    pub fn view_get<'r, Q>(&'r self) -> impl Iterator<Item = (Entity, Q::Refs<'r>)> + 'r
    where
        Q: Query<S> + 'r,
    {
        let components = &self.components;
        self.view::<Q>()
            .map(move |entity| (entity, Q::fetch(components, entity.slot())))
    }

    /// Calls `visit` for every entity that has every type in `Q`.
    pub fn each<'r, Q, F>(&'r self, mut visit: F)
    where
        Q: Query<S> + 'r,
        F: FnMut(Entity, Q::Refs<'r>),
    {
        for (entity, refs) in self.view_get::<Q>() {
            visit(entity, refs);
        }
    }

    /// Calls `visit` with every stored `T`, mutably.
    ///
    /// Visit order follows the pool's dense storage and is unspecified.
    pub fn each_mut<T, F>(&mut self, mut visit: F)
    where
        S: Contains<T>,
        T: 'static,
        F: FnMut(Entity, &mut T),
    {
        let entities = &self.entities;
        Contains::<T>::pool_mut(&mut self.components)
            .for_each_mut(|index, value| visit(entities.entity_at(index), value));
    }

    /// Returns the first entity in `view::<Q>()` accepted by `predicate`, or
    /// [`Entity::NULL`] if there is none.
    #[must_use]
    pub fn find<Q, P>(&self, predicate: P) -> Entity
    where
        Q: Query<S>,
        P: FnMut(&Entity) -> bool,
    {
        self.view::<Q>().find(predicate).unwrap_or(Entity::NULL)
    }

    /// Returns the first entity that has every type in `Q`, or
    /// [`Entity::NULL`].
    #[must_use]
    pub fn first<Q: Query<S>>(&self) -> Entity {
        self.view::<Q>().next().unwrap_or(Entity::NULL)
    }

    /// Destroys every entity in `view::<Q>()` accepted by `predicate` and
    /// returns how many were destroyed.
    ///
    /// Matches are collected before anything is destroyed, so `predicate`
    /// sees the registry in its original state.
    pub fn destroy_if<Q, P>(&mut self, mut predicate: P) -> usize
    where
        Q: Query<S>,
        P: FnMut(&Self, Entity) -> bool,
    {
        let this: &Self = self;
        let doomed: Vec<Entity> = this
            .view::<Q>()
            .filter(|&entity| predicate(this, entity))
            .collect();
        let destroyed = doomed.len();
        self.destroy_many(doomed);
        debug!(destroyed, remaining = self.len(), "destroy_if finished");
        destroyed
    }

    /// Creates a copy of `source` in `target`, cloning every component it has.
    ///
    /// `target`'s `on_add` listeners fire for each cloned component.
    ///
    /// # Panics
    ///
    /// Panics if `source` is not alive in this registry.
    pub fn copy_entity(&self, source: Entity, target: &mut Self) -> Entity
    where
        S::Types: CloneQuery<S>,
    {
        assert!(self.valid(source), "cannot copy dead entity {source}");
        let copy = target.create();
        <S::Types as CloneQuery<S>>::clone_components(
            &self.components,
            source,
            &mut target.components,
            copy,
        );
        trace!(%source, %copy, "entity copied");
        copy
    }
}

#[cold]
#[track_caller]
fn missing<T>(entity: Entity) -> ! {
    panic!("entity {entity} has no `{}` component", type_name::<T>())
}
