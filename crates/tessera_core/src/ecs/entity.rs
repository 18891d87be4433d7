//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - A slot index into the component stores
//! - A generation counter for safe reuse
//!
//! Retired entities wait in a FIFO queue. When a slot is handed out again its
//! generation is bumped, so a stale copy of the old entity never compares
//! equal to the new occupant.

use std::collections::VecDeque;
use std::fmt;

use bytemuck::{Pod, Zeroable};

use super::storage::SparseSet;

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Slot index into component stores
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
#[repr(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Null/invalid entity. Never issued by a registry.
    pub const NULL: Self = Self(u64::MAX);

    /// Creates a new entity from slot index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-1)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the slot index portion of the entity.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Checks if this entity is the null sentinel.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }

    /// Returns the packed 64-bit representation.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Rebuilds an entity from its packed 64-bit representation.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the entity that reuses this slot one generation later.
    ///
    /// Generations wrap around on overflow.
    #[inline]
    #[must_use]
    pub const fn next_generation(self) -> Self {
        Self::new(self.index(), self.generation().wrapping_add(1))
    }

    #[inline]
    pub(crate) const fn slot(self) -> usize {
        self.index() as usize
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("Entity(null)")
        } else {
            write!(f, "Entity({}v{})", self.index(), self.generation())
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}

/// Hands out entities and recycles their slots.
///
/// ```text
/// live:    SparseSet<Entity>   slot -> entity currently occupying it
/// retired: [e3v0, e1v2]        destroyed entities, oldest first
/// ```
///
/// A fresh slot is only allocated when `retired` is empty. In that state every
/// slot handed out so far is live, so `live.len()` is the next unused index.
#[derive(Clone, Debug, Default)]
pub struct EntityAllocator {
    /// Entities currently alive, keyed by slot index.
    live: SparseSet<Entity>,
    /// Destroyed entities awaiting reuse (FIFO).
    retired: VecDeque<Entity>,
}

impl EntityAllocator {
    /// Creates an empty allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator with room for `capacity` live entities.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            live: SparseSet::with_capacity(capacity),
            retired: VecDeque::new(),
        }
    }

    /// Issues a new entity.
    ///
    /// Reuses the oldest retired slot with its generation bumped, otherwise
    /// allocates the next unused slot at generation 0.
    ///
    /// # Panics
    ///
    /// Panics if the 32-bit slot space is exhausted.
    pub fn allocate(&mut self) -> Entity {
        let entity = match self.retired.pop_front() {
            Some(old) => old.next_generation(),
            None => {
                let index = u32::try_from(self.live.len())
                    .ok()
                    .filter(|&index| index != u32::MAX)
                    .unwrap_or_else(|| panic!("entity slot space exhausted"));
                Entity::new(index, 0)
            }
        };
        self.live.insert(entity.slot(), entity);
        entity
    }

    /// Checks if an entity is currently alive.
    ///
    /// False for [`Entity::NULL`] and for stale generations.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        !entity.is_null() && self.live.get(entity.slot()) == Some(&entity)
    }

    /// Retires a live entity, queueing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive.
    pub fn release(&mut self, entity: Entity) {
        assert!(self.is_alive(entity), "cannot release dead entity {entity}");
        self.live.erase(entity.slot());
        self.retired.push_back(entity);
    }

    /// Returns the entity occupying `index`, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Entity> {
        self.live.get(index).copied()
    }

    /// Returns the entity occupying `index`.
    ///
    /// # Panics
    ///
    /// Panics if the slot is not occupied.
    #[inline]
    #[must_use]
    pub fn entity_at(&self, index: usize) -> Entity {
        self.live[index]
    }

    /// Live entities in dense (unstable) order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Entity] {
        self.live.values()
    }

    /// Iterates over live entities in ascending slot order.
    ///
    /// Walks every slot ever allocated, unlike [`as_slice`](Self::as_slice).
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.live.iter_by_index().map(|(_, &entity)| entity)
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if no entity is alive.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of retired entities waiting for reuse.
    #[inline]
    #[must_use]
    pub fn retired_len(&self) -> usize {
        self.retired.len()
    }

    /// Reserves room for `additional` more live entities.
    pub fn reserve(&mut self, additional: usize) {
        self.live.reserve(additional);
    }

    /// Forgets every live and retired entity.
    ///
    /// Slot numbering restarts at 0, generation 0.
    pub fn clear(&mut self) {
        self.live.clear();
        self.retired.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_roundtrip() {
        let id = Entity::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.generation(), 67890);
        assert_eq!(Entity::from_bits(id.to_bits()), id);
    }

    #[test]
    fn test_null_entity() {
        assert!(Entity::NULL.is_null());
        assert!(Entity::default().is_null());
        assert!(!Entity::new(0, 0).is_null());
        assert_eq!(Entity::NULL.to_string(), "null");
    }

    #[test]
    fn test_next_generation_wraps() {
        let e = Entity::new(7, u32::MAX);
        let next = e.next_generation();
        assert_eq!(next.index(), 7);
        assert_eq!(next.generation(), 0);
        assert_ne!(next, e);
    }

    #[test]
    fn test_entity_formatting() {
        let e = Entity::new(3, 1);
        assert_eq!(e.to_string(), "3v1");
        assert_eq!(format!("{e:?}"), "Entity(3v1)");
    }

    #[test]
    fn test_entity_is_pod() {
        let entities = [Entity::new(1, 0), Entity::new(2, 5)];
        let raw: &[u64] = bytemuck::cast_slice(&entities);
        assert_eq!(raw, &[1, (5u64 << 32) | 2]);
    }

    #[test]
    fn test_allocate_fresh_slots() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_eq!(a, Entity::new(0, 0));
        assert_eq!(b, Entity::new(1, 0));
        assert_eq!(alloc.len(), 2);
    }

    #[test]
    fn test_recycle_is_fifo_and_bumps_generation() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        let _c = alloc.allocate();

        alloc.release(b);
        alloc.release(a);
        assert_eq!(alloc.retired_len(), 2);

        let first = alloc.allocate();
        let second = alloc.allocate();
        assert_eq!(first, Entity::new(b.index(), 1));
        assert_eq!(second, Entity::new(a.index(), 1));
        assert_eq!(alloc.retired_len(), 0);

        assert!(!alloc.is_alive(a));
        assert!(!alloc.is_alive(b));
        assert!(alloc.is_alive(first));
    }

    #[test]
    fn test_stale_entity_never_revalidates() {
        let mut alloc = EntityAllocator::new();
        let old = alloc.allocate();
        alloc.release(old);
        let new = alloc.allocate();
        assert_eq!(old.index(), new.index());
        assert!(!alloc.is_alive(old));
        assert!(alloc.is_alive(new));
    }

    #[test]
    fn test_iter_follows_slot_order() {
        let mut alloc = EntityAllocator::new();
        let entities: Vec<_> = (0..5).map(|_| alloc.allocate()).collect();
        alloc.release(entities[0]);
        alloc.release(entities[3]);
        let reused = alloc.allocate();

        let live: Vec<_> = alloc.iter().collect();
        assert_eq!(live, vec![reused, entities[1], entities[2], entities[4]]);
    }

    #[test]
    fn test_null_is_never_alive() {
        let mut alloc = EntityAllocator::new();
        alloc.allocate();
        assert!(!alloc.is_alive(Entity::NULL));
    }

    #[test]
    fn test_clear_restarts_numbering() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        alloc.allocate();
        alloc.release(a);
        alloc.clear();
        assert!(alloc.is_empty());
        assert_eq!(alloc.retired_len(), 0);
        assert_eq!(alloc.allocate(), Entity::new(0, 0));
    }

    #[test]
    #[should_panic(expected = "cannot release dead entity")]
    fn test_double_release_panics() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        alloc.release(a);
        alloc.release(a);
    }
}
