//! # Entity Handles
//!
//! A [`Handle`] pairs an entity with a mutable borrow of its registry so that
//! per-entity code does not have to thread both around.

use super::component::{ComponentSet, Contains};
use super::entity::Entity;
use super::registry::Registry;
use super::view::Query;

/// An entity bound to the registry that owns it.
///
/// Every method forwards to the [`Registry`] method of the same name with
/// the bound entity, and has the same preconditions.
///
/// ```rust
/// use tessera_core::{component_set, Registry};
///
/// #[derive(Debug, PartialEq)]
/// struct Label(&'static str);
///
/// component_set! {
///     struct Labels {
///         labels: Label,
///     }
/// }
///
/// let mut registry = Registry::<Labels>::new();
/// let mut handle = registry.create_handle();
/// handle.add(Label("root"));
/// assert_eq!(handle.get::<Label>(), &Label("root"));
/// let entity = handle.entity();
/// assert!(registry.has::<Label>(entity));
/// ```
pub struct Handle<'r, S: ComponentSet> {
    registry: &'r mut Registry<S>,
    entity: Entity,
}

impl<'r, S: ComponentSet> Handle<'r, S> {
    pub(crate) fn new(registry: &'r mut Registry<S>, entity: Entity) -> Self {
        Self { registry, entity }
    }

    /// The bound entity.
    #[inline]
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// The registry the entity belongs to.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry<S> {
        self.registry
    }

    /// See [`Registry::valid`].
    #[inline]
    #[must_use]
    pub fn valid(&self) -> bool {
        self.registry.valid(self.entity)
    }

    /// Destroys the entity, consuming the handle. See [`Registry::destroy`].
    pub fn destroy(self) {
        self.registry.destroy(self.entity);
    }

    /// See [`Registry::add`].
    pub fn add<T>(&mut self, value: T) -> &mut T
    where
        S: Contains<T>,
        T: 'static,
    {
        self.registry.add(self.entity, value)
    }

    /// See [`Registry::emplace`].
    pub fn emplace<T, F>(&mut self, make: F) -> &mut T
    where
        S: Contains<T>,
        T: 'static,
        F: FnOnce() -> T,
    {
        self.registry.emplace(self.entity, make)
    }

    /// See [`Registry::emplace_default`].
    pub fn emplace_default<T>(&mut self) -> &mut T
    where
        S: Contains<T>,
        T: Default + 'static,
    {
        self.registry.emplace_default(self.entity)
    }

    /// See [`Registry::remove`].
    pub fn remove<T>(&mut self) -> Option<T>
    where
        S: Contains<T>,
        T: 'static,
    {
        self.registry.remove(self.entity)
    }

    /// See [`Registry::remove_all_components`].
    pub fn remove_all_components(&mut self) {
        self.registry.remove_all_components(self.entity);
    }

    /// See [`Registry::has`].
    #[must_use]
    pub fn has<T>(&self) -> bool
    where
        S: Contains<T>,
        T: 'static,
    {
        self.registry.has::<T>(self.entity)
    }

    /// See [`Registry::has_all`].
    #[must_use]
    pub fn has_all<Q: Query<S>>(&self) -> bool {
        self.registry.has_all::<Q>(self.entity)
    }

    /// See [`Registry::has_any`].
    #[must_use]
    pub fn has_any<Q: Query<S>>(&self) -> bool {
        self.registry.has_any::<Q>(self.entity)
    }

    /// See [`Registry::get`].
    #[must_use]
    pub fn get<T>(&self) -> &T
    where
        S: Contains<T>,
        T: 'static,
    {
        self.registry.get(self.entity)
    }

    /// See [`Registry::get_mut`].
    pub fn get_mut<T>(&mut self) -> &mut T
    where
        S: Contains<T>,
        T: 'static,
    {
        self.registry.get_mut(self.entity)
    }

    /// See [`Registry::get_if`].
    #[must_use]
    pub fn get_if<T>(&self) -> Option<&T>
    where
        S: Contains<T>,
        T: 'static,
    {
        self.registry.get_if(self.entity)
    }

    /// See [`Registry::get_if_mut`].
    pub fn get_if_mut<T>(&mut self) -> Option<&mut T>
    where
        S: Contains<T>,
        T: 'static,
    {
        self.registry.get_if_mut(self.entity)
    }
}
