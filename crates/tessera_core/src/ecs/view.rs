//! # Views
//!
//! A view is the lazy sequence of entities carrying every component type in a
//! query tuple `(T1, .., Tn)`.
//!
//! ## Driver Store
//!
//! ```text
//! view::<(Frozen, Position)>()
//!
//! Frozen   dense: [7, 2]           <- driver, iterated directly
//! Position sparse: has(7)? has(2)?  <- filter, O(1) per candidate
//! ```
//!
//! The first type drives iteration, so the cost is proportional to how many
//! entities carry `T1`. Put the rarest type first.
//!
//! The empty query `()` iterates every live entity.

use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::slice;

use super::component::{ComponentSet, Contains};
use super::entity::{Entity, EntityAllocator};

/// A tuple of component types that can be tested against and fetched from a
/// component set.
///
/// Implemented for `()` and tuples of up to twelve types, each of which must
/// be declared by `S`.
pub trait Query<S: ComponentSet> {
    /// Shared references to one entity's components, in tuple order.
    type Refs<'a>
    where
        S: 'a;

    /// Dense slot indices of the driver store, or `None` for the empty query.
    fn driver(set: &S) -> Option<&[usize]>;

    /// Returns `true` if `index` carries every type of the query.
    fn has_all(set: &S, index: usize) -> bool;

    /// Returns `true` if `index` carries at least one type of the query.
    fn has_any(set: &S, index: usize) -> bool;

    /// Returns `true` if `index` carries every type after the driver.
    fn has_rest(set: &S, index: usize) -> bool;

    /// Borrows every component of the query for `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` lacks one of the types.
    fn fetch(set: &S, index: usize) -> Self::Refs<'_>;
}

/// A query whose component types can all be cloned from one set into another.
pub trait CloneQuery<S: ComponentSet>: Query<S> {
    /// Clones each queried component `source` carries onto `target`.
    ///
    /// Inserting into `target_set` notifies its `on_add` listeners.
    fn clone_components(source_set: &S, source: Entity, target_set: &mut S, target: Entity);
}

impl<S: ComponentSet> Query<S> for () {
    type Refs<'a> = () where S: 'a;

    #[inline]
    fn driver(_set: &S) -> Option<&[usize]> {
        None
    }

    #[inline]
    fn has_all(_set: &S, _index: usize) -> bool {
        true
    }

    #[inline]
    fn has_any(_set: &S, _index: usize) -> bool {
        false
    }

    #[inline]
    fn has_rest(_set: &S, _index: usize) -> bool {
        true
    }

    #[inline]
    fn fetch(_set: &S, _index: usize) -> Self::Refs<'_> {}
}

impl<S: ComponentSet> CloneQuery<S> for () {
    fn clone_components(_source_set: &S, _source: Entity, _target_set: &mut S, _target: Entity) {}
}

macro_rules! impl_query {
    ($head:ident $(, $tail:ident)*) => {
        impl<S, $head, $($tail),*> Query<S> for ($head, $($tail,)*)
        where
            S: ComponentSet + Contains<$head> $(+ Contains<$tail>)*,
            $head: 'static,
            $($tail: 'static,)*
        {
            type Refs<'a> = (&'a $head, $(&'a $tail,)*) where S: 'a;

            #[inline]
            fn driver(set: &S) -> Option<&[usize]> {
                Some(<S as Contains<$head>>::pool(set).storage().indices())
            }

            #[inline]
            fn has_all(set: &S, index: usize) -> bool {
                <S as Contains<$head>>::pool(set).storage().has(index) && Self::has_rest(set, index)
            }

            #[inline]
            fn has_any(set: &S, index: usize) -> bool {
                <S as Contains<$head>>::pool(set).storage().has(index)
                    $(|| <S as Contains<$tail>>::pool(set).storage().has(index))*
            }

            #[inline]
            fn has_rest(set: &S, index: usize) -> bool {
                let _ = (set, index);
                true $(&& <S as Contains<$tail>>::pool(set).storage().has(index))*
            }

            #[inline]
            fn fetch(set: &S, index: usize) -> Self::Refs<'_> {
                (
                    &<S as Contains<$head>>::pool(set).storage()[index],
                    $(&<S as Contains<$tail>>::pool(set).storage()[index],)*
                )
            }
        }

        impl<S, $head, $($tail),*> CloneQuery<S> for ($head, $($tail,)*)
        where
            S: ComponentSet + Contains<$head> $(+ Contains<$tail>)*,
            $head: Clone + 'static,
            $($tail: Clone + 'static,)*
        {
            fn clone_components(source_set: &S, source: Entity, target_set: &mut S, target: Entity) {
                if let Some(value) = <S as Contains<$head>>::pool(source_set).get(source) {
                    <S as Contains<$head>>::pool_mut(target_set).insert(target, value.clone());
                }
                $(
                    if let Some(value) = <S as Contains<$tail>>::pool(source_set).get(source) {
                        <S as Contains<$tail>>::pool_mut(target_set).insert(target, value.clone());
                    }
                )*
            }
        }
    };
}

impl_query!(A);
impl_query!(A, B);
impl_query!(A, B, C);
impl_query!(A, B, C, D);
impl_query!(A, B, C, D, E);
impl_query!(A, B, C, D, E, F);
impl_query!(A, B, C, D, E, F, G);
impl_query!(A, B, C, D, E, F, G, H);
impl_query!(A, B, C, D, E, F, G, H, I);
impl_query!(A, B, C, D, E, F, G, H, I, J);
impl_query!(A, B, C, D, E, F, G, H, I, J, K);
impl_query!(A, B, C, D, E, F, G, H, I, J, K, L);

/// Where a view draws its candidates from.
#[derive(Clone)]
enum Source<'r> {
    /// Every live entity; no filtering needed.
    All(slice::Iter<'r, Entity>),
    /// Slot indices of the driver store, filtered by the remaining types.
    Driven(slice::Iter<'r, usize>),
}

/// Lazy iterator over the entities matching the query `Q`.
///
/// Borrows the registry, so it cannot outlive a structural mutation.
/// Cloning a view restarts nothing; it forks the iteration at its current
/// position. Call [`Registry::view`](crate::Registry::view) again to restart.
pub struct View<'r, S: ComponentSet, Q> {
    entities: &'r EntityAllocator,
    components: &'r S,
    source: Source<'r>,
    _query: PhantomData<fn() -> Q>,
}

impl<'r, S, Q> View<'r, S, Q>
where
    S: ComponentSet,
    Q: Query<S>,
{
    pub(crate) fn new(entities: &'r EntityAllocator, components: &'r S) -> Self {
        let source = match Q::driver(components) {
            Some(indices) => Source::Driven(indices.iter()),
            None => Source::All(entities.as_slice().iter()),
        };
        Self {
            entities,
            components,
            source,
            _query: PhantomData,
        }
    }

    /// Number of candidates left to inspect.
    ///
    /// An upper bound on the remaining matches.
    #[must_use]
    pub fn candidates(&self) -> usize {
        match &self.source {
            Source::All(iter) => iter.len(),
            Source::Driven(iter) => iter.len(),
        }
    }
}

impl<S: ComponentSet, Q> Clone for View<'_, S, Q> {
    fn clone(&self) -> Self {
        Self {
            entities: self.entities,
            components: self.components,
            source: self.source.clone(),
            _query: PhantomData,
        }
    }
}

impl<S, Q> Iterator for View<'_, S, Q>
where
    S: ComponentSet,
    Q: Query<S>,
{
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let components = self.components;
        let entities = self.entities;
        match &mut self.source {
            Source::All(iter) => iter.next().copied(),
            Source::Driven(iter) => iter
                .find(|&&index| Q::has_rest(components, index))
                .map(|&index| entities.entity_at(index)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.source {
            Source::All(iter) => iter.size_hint(),
            Source::Driven(iter) => (0, Some(iter.len())),
        }
    }
}

impl<S, Q> FusedIterator for View<'_, S, Q>
where
    S: ComponentSet,
    Q: Query<S>,
{
}
