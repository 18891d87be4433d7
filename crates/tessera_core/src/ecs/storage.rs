//! # Sparse Set Storage
//!
//! Dense component storage keyed by small unsigned integers.
//!
//! ```text
//! sparse:  [EMPTY, 1, EMPTY, 0]     slot -> dense position
//! indices: [3, 1]                   dense position -> slot
//! values:  [V3, V1]                 dense position -> value
//! ```
//!
//! - Insert, lookup and erase are O(1)
//! - Values are contiguous, so iteration is cache-friendly
//! - Erase swaps the last element into the hole, so dense order is not stable

use std::ops::{Index, IndexMut};

/// Marks an unoccupied slot in the sparse array.
const EMPTY: usize = usize::MAX;

/// Associative container from slot index to value, backed by a dense array.
///
/// # Invariant
///
/// For every occupied slot `i`, `sparse[i]` is a position `p` with
/// `indices[p] == i`. Every other slot is `EMPTY` or past the end of `sparse`.
///
/// # Example
///
/// ```rust
/// use tessera_core::SparseSet;
///
/// let mut set = SparseSet::new();
/// set.insert(2, "two");
/// set.insert(9, "nine");
/// set.erase(2);
/// assert!(set.has(9));
/// assert_eq!(set[9], "nine");
/// ```
#[derive(Clone, Debug)]
pub struct SparseSet<V> {
    /// Slot index -> dense position, or `EMPTY`.
    sparse: Vec<usize>,
    /// Dense position -> slot index.
    indices: Vec<usize>,
    /// Dense position -> value. Always the same length as `indices`.
    values: Vec<V>,
}

impl<V> Default for SparseSet<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SparseSet<V> {
    /// Creates an empty set without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sparse: Vec::new(),
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Creates an empty set with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sparse: Vec::with_capacity(capacity),
            indices: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Reserves room for `additional` more values.
    pub fn reserve(&mut self, additional: usize) {
        self.sparse.reserve(additional);
        self.indices.reserve(additional);
        self.values.reserve(additional);
    }

    /// Number of values the dense array holds without reallocating.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Number of stored values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the set holds no values.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if `index` holds a value.
    #[inline]
    #[must_use]
    pub fn has(&self, index: usize) -> bool {
        self.sparse.get(index).is_some_and(|&position| position != EMPTY)
    }

    /// Grows the sparse array so that `index` is addressable.
    fn assure(&mut self, index: usize) {
        assert!(index != EMPTY, "index {index} is reserved");
        assert!(!self.has(index), "index {index} is already occupied");
        if self.sparse.len() <= index {
            self.sparse.resize(index + 1, EMPTY);
        }
    }

    /// Stores `value` at `index`, returning a reference to it.
    ///
    /// # Panics
    ///
    /// Panics if `index` is already occupied.
    pub fn insert(&mut self, index: usize, value: V) -> &mut V {
        self.insert_with(index, || value)
    }

    /// Stores the value built by `make` at `index`.
    ///
    /// `make` only runs once the slot has been checked, and the set is left
    /// untouched if it panics.
    ///
    /// # Panics
    ///
    /// Panics if `index` is already occupied.
    pub fn insert_with<F>(&mut self, index: usize, make: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        self.assure(index);
        let value = make();
        let position = self.values.len();
        self.sparse[index] = position;
        self.indices.push(index);
        self.values.push(value);
        &mut self.values[position]
    }

    /// Returns the value at `index`, inserting one built by `make` if absent.
    pub fn get_or_insert_with<F>(&mut self, index: usize, make: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        match self.position(index) {
            Some(position) => &mut self.values[position],
            None => self.insert_with(index, make),
        }
    }

    /// Removes and returns the value at `index`.
    ///
    /// The last dense element is moved into the vacated position, so any
    /// previously observed dense order is invalidated.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not occupied.
    pub fn erase(&mut self, index: usize) -> V {
        let Some(position) = self.position(index) else {
            panic!("index {index} is not occupied");
        };

        self.sparse[index] = EMPTY;
        self.indices.swap_remove(position);
        let value = self.values.swap_remove(position);

        // Repoint the element that was moved into the hole, if any.
        if let Some(&moved) = self.indices.get(position) {
            self.sparse[moved] = position;
        }

        value
    }

    /// Removes the value at `index` if there is one.
    pub fn take(&mut self, index: usize) -> Option<V> {
        if self.has(index) {
            Some(self.erase(index))
        } else {
            None
        }
    }

    /// Returns the value at `index`, or `None` if the slot is empty.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&V> {
        self.position(index).map(|position| &self.values[position])
    }

    /// Returns the value at `index` mutably, or `None` if the slot is empty.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut V> {
        self.position(index).map(|position| &mut self.values[position])
    }

    /// Drops every value. Allocations are kept for reuse.
    pub fn clear(&mut self) {
        self.sparse.clear();
        self.indices.clear();
        self.values.clear();
    }

    /// Slot indices in dense order.
    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Values in dense order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Values in dense order, mutably.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [V] {
        &mut self.values
    }

    /// Iterates over `(index, value)` pairs in dense order.
    ///
    /// The order is neither insertion order nor index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &V)> + Clone + '_ {
        self.indices.iter().copied().zip(self.values.iter())
    }

    /// Iterates mutably over `(index, value)` pairs in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut V)> + '_ {
        self.indices.iter().copied().zip(self.values.iter_mut())
    }

    /// Iterates over `(index, value)` pairs in ascending index order.
    ///
    /// Walks the whole sparse array, so the cost is proportional to the
    /// highest index ever used rather than to `len()`.
    pub fn iter_by_index(&self) -> impl Iterator<Item = (usize, &V)> + '_ {
        self.sparse
            .iter()
            .enumerate()
            .filter(|&(_, &position)| position != EMPTY)
            .map(|(index, &position)| (index, &self.values[position]))
    }

    #[inline]
    fn position(&self, index: usize) -> Option<usize> {
        match self.sparse.get(index) {
            Some(&position) if position != EMPTY => Some(position),
            _ => None,
        }
    }
}

impl<V> Index<usize> for SparseSet<V> {
    type Output = V;

    fn index(&self, index: usize) -> &V {
        match self.position(index) {
            Some(position) => &self.values[position],
            None => panic!("index {index} is not occupied"),
        }
    }
}

impl<V> IndexMut<usize> for SparseSet<V> {
    fn index_mut(&mut self, index: usize) -> &mut V {
        match self.position(index) {
            Some(position) => &mut self.values[position],
            None => panic!("index {index} is not occupied"),
        }
    }
}
