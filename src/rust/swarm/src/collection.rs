use rayon::prelude::*;
use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;
use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;

use crate::disjoint::{DimensionTable, DisjointSetError, ForestStats};
use crate::interner::{ElementId, Interner};

/// DisjointSetCollection: several independent partitionings of one universe
/// of named elements, one per dimension key.
///
/// Elements are interned once and shared by every dimension; each dimension
/// keeps its own forest, so unions in one dimension never show up in another.
/// Lookups compress paths and therefore take `&mut self`.
#[derive(Debug, Clone)]
pub struct DisjointSetCollection<E, D> {
    names: Interner<E>,
    dimensions: FxHashMap<D, DimensionTable>,
}

impl<E, D> Default for DisjointSetCollection<E, D>
where
    E: Clone + Eq + Hash + Debug,
    D: Clone + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, D> DisjointSetCollection<E, D>
where
    E: Clone + Eq + Hash + Debug,
    D: Clone + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self {
            names: Interner::new(),
            dimensions: FxHashMap::default(),
        }
    }

    /// Create a collection with room for `elements` distinct elements.
    pub fn with_capacity(elements: usize) -> Self {
        Self {
            names: Interner::with_capacity(elements),
            dimensions: FxHashMap::default(),
        }
    }

    /// Ensure `element` has a node in `dimension` and return its current root.
    ///
    /// A new node starts as the root of a class of one. An element already
    /// merged into a larger class keeps its class, and that class's root is
    /// returned.
    pub fn make_singleton<Q>(&mut self, dimension: &D, element: &Q) -> ElementId
    where
        E: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = E> + ?Sized,
    {
        let id = self.names.intern(element);
        let table = self.dimensions.entry(dimension.clone()).or_default();
        let slot = table.get_or_create_node(id);
        let root = table.find(slot);
        table.element_at(root)
    }

    /// Make a class out of `elements` in `dimension`: ensure a node for the
    /// first element, then union every following element into it, in order.
    ///
    /// # Returns
    /// Root of the resulting class
    ///
    /// # Errors
    /// `InvalidArgument` if `elements` is empty; nothing is created in that case.
    pub fn make_set<'a, Q, I>(
        &mut self,
        dimension: &D,
        elements: I,
    ) -> Result<ElementId, DisjointSetError>
    where
        I: IntoIterator<Item = &'a Q>,
        E: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = E> + ?Sized + 'a,
    {
        let mut elements = elements.into_iter();
        let first = elements.next().ok_or(DisjointSetError::InvalidArgument(
            "make_set needs at least one element",
        ))?;

        let first_id = self.names.intern(first);
        let table = self.dimensions.entry(dimension.clone()).or_default();
        let first_slot = table.get_or_create_node(first_id);

        for element in elements {
            let id = self.names.intern(element);
            let slot = table.get_or_create_node(id);
            if let Some(merge) = table.union(first_slot, slot) {
                log::trace!(
                    "dimension {:?}: {} absorbed into {} (size {})",
                    dimension,
                    merge.absorbed,
                    merge.survivor,
                    merge.size
                );
            }
        }

        let root = table.find(first_slot);
        Ok(table.element_at(root))
    }

    /// Apply `make_set` to each sequence in `sets`.
    ///
    /// All sequences are checked before any is applied, so an empty sequence
    /// anywhere fails the whole call without touching the collection.
    pub fn make_sets<'a, Q, S, I>(&mut self, dimension: &D, sets: S) -> Result<(), DisjointSetError>
    where
        S: IntoIterator<Item = I>,
        I: IntoIterator<Item = &'a Q>,
        E: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = E> + ?Sized + 'a,
    {
        let sets: Vec<Vec<&'a Q>> = sets
            .into_iter()
            .map(|set| set.into_iter().collect())
            .collect();

        if sets.iter().any(Vec::is_empty) {
            return Err(DisjointSetError::InvalidArgument(
                "make_sets got an empty element sequence",
            ));
        }

        for set in sets {
            self.make_set(dimension, set)?;
        }
        Ok(())
    }

    /// Find the root of `element`'s class in `dimension`, compressing every
    /// node on the path.
    ///
    /// # Errors
    /// `NotFound` if `element` never got a node in `dimension`
    pub fn find_root<Q>(&mut self, dimension: &D, element: &Q) -> Result<ElementId, DisjointSetError>
    where
        E: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let id = self
            .names
            .get(element)
            .ok_or_else(|| DisjointSetError::not_found(dimension, element))?;
        self.find_root_id(dimension, id)
    }

    /// Same as `find_root`, addressed by element handle.
    pub fn find_root_id(
        &mut self,
        dimension: &D,
        id: ElementId,
    ) -> Result<ElementId, DisjointSetError> {
        let names = &self.names;
        let missing = || match names.resolve(id) {
            Some(element) => DisjointSetError::not_found(dimension, element),
            None => DisjointSetError::not_found(dimension, &id),
        };

        let table = self.dimensions.get_mut(dimension).ok_or_else(missing)?;
        let slot = table.slot_of(id).ok_or_else(missing)?;
        let root = table.find(slot);
        Ok(table.element_at(root))
    }

    /// All elements in the same class as `element` in `dimension`, in
    /// registration order.
    pub fn find_members<Q>(&mut self, dimension: &D, element: &Q) -> Result<Vec<&E>, DisjointSetError>
    where
        E: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let ids = self.member_ids(dimension, element)?;
        Ok(self.resolve_all(&ids))
    }

    /// Handles of the class members of `element` in `dimension`.
    ///
    /// Served from the member set the root keeps, so it costs one
    /// `find_root` plus a copy of the set.
    pub fn member_ids<Q>(&mut self, dimension: &D, element: &Q) -> Result<RoaringBitmap, DisjointSetError>
    where
        E: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let root = self.find_root(dimension, element)?;
        let table = self
            .dimensions
            .get(dimension)
            .ok_or_else(|| DisjointSetError::not_found(dimension, element))?;
        let slot = table
            .slot_of(root)
            .ok_or_else(|| DisjointSetError::not_found(dimension, element))?;
        Ok(table.node(slot).members.clone())
    }

    /// Merge the classes of `a` and `b` in `dimension`.
    ///
    /// # Returns
    /// `true` if two classes were merged, `false` if `a` and `b` already
    /// shared a class
    ///
    /// # Errors
    /// `NotFound` if either element has no node in `dimension`. Both are
    /// checked before anything is merged.
    pub fn make_union<Q>(&mut self, dimension: &D, a: &Q, b: &Q) -> Result<bool, DisjointSetError>
    where
        E: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let a_slot = self.locate(dimension, a)?;
        let b_slot = self.locate(dimension, b)?;

        let table = self
            .dimensions
            .get_mut(dimension)
            .ok_or_else(|| DisjointSetError::not_found(dimension, a))?;

        match table.union(a_slot, b_slot) {
            Some(merge) => {
                log::debug!(
                    "dimension {:?}: merged {:?} into {:?}, class size {}",
                    dimension,
                    self.names.resolve(merge.absorbed),
                    self.names.resolve(merge.survivor),
                    merge.size
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Check whether `a` and `b` share a class in `dimension`.
    pub fn connected<Q>(&mut self, dimension: &D, a: &Q, b: &Q) -> Result<bool, DisjointSetError>
    where
        E: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let a_slot = self.locate(dimension, a)?;
        let b_slot = self.locate(dimension, b)?;
        match self.dimensions.get_mut(dimension) {
            Some(table) => Ok(table.connected(a_slot, b_slot)),
            None => Err(DisjointSetError::not_found(dimension, a)),
        }
    }

    /// Roots of every class in `dimension`, in registration order.
    ///
    /// A dimension that was never used has no classes and yields an empty list.
    pub fn get_roots(&self, dimension: &D) -> Vec<&E> {
        match self.dimensions.get(dimension) {
            Some(table) => self.resolve_all(table.roots()),
            None => Vec::new(),
        }
    }

    /// Root handles of `dimension`; empty for a never-used dimension.
    pub fn root_ids(&self, dimension: &D) -> RoaringBitmap {
        self.dimensions
            .get(dimension)
            .map(|table| table.roots().clone())
            .unwrap_or_default()
    }

    /// Number of classes in `dimension`.
    pub fn class_count(&self, dimension: &D) -> usize {
        self.dimensions
            .get(dimension)
            .map_or(0, DimensionTable::class_count)
    }

    /// Size of `element`'s class in `dimension`.
    pub fn class_size<Q>(&mut self, dimension: &D, element: &Q) -> Result<u64, DisjointSetError>
    where
        E: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        Ok(self.member_ids(dimension, element)?.len())
    }

    /// Every class of `dimension`, each in registration order, classes
    /// ordered by their root. Read-only: no paths are compressed.
    pub fn classes(&self, dimension: &D) -> Vec<Vec<&E>> {
        match self.dimensions.get(dimension) {
            Some(table) => self.classes_of(table),
            None => Vec::new(),
        }
    }

    /// Whether `element` has a node in `dimension`.
    pub fn contains<Q>(&self, dimension: &D, element: &Q) -> bool
    where
        E: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match (self.names.get(element), self.dimensions.get(dimension)) {
            (Some(id), Some(table)) => table.has_node(id),
            _ => false,
        }
    }

    /// Element for a handle.
    pub fn element(&self, id: ElementId) -> Option<&E> {
        self.names.resolve(id)
    }

    /// Handle of a registered element.
    pub fn element_id<Q>(&self, element: &Q) -> Option<ElementId>
    where
        E: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.names.get(element)
    }

    /// Forest of one dimension, for inspection.
    pub fn table(&self, dimension: &D) -> Option<&DimensionTable> {
        self.dimensions.get(dimension)
    }

    /// Dimensions that have at least one node.
    pub fn dimensions(&self) -> impl Iterator<Item = &D> {
        self.dimensions.keys()
    }

    /// Number of registered elements across all dimensions.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Repoint every node of `dimension` directly at its root. Returns the
    /// number of rewritten parent pointers; 0 for an unknown dimension.
    pub fn flatten(&mut self, dimension: &D) -> usize {
        match self.dimensions.get_mut(dimension) {
            Some(table) => table.flatten(),
            None => 0,
        }
    }

    pub fn stats(&self, dimension: &D) -> Option<ForestStats> {
        self.dimensions.get(dimension).map(DimensionTable::stats)
    }

    /// Release every node of `dimension` at once. Later queries on it fail
    /// with `NotFound` until it is populated again.
    pub fn drop_dimension(&mut self, dimension: &D) -> bool {
        match self.dimensions.remove(dimension) {
            Some(table) => {
                log::debug!(
                    "released dimension {:?} ({} nodes, {} classes)",
                    dimension,
                    table.len(),
                    table.class_count()
                );
                true
            }
            None => false,
        }
    }

    fn locate<Q>(&self, dimension: &D, element: &Q) -> Result<u32, DisjointSetError>
    where
        E: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.names
            .get(element)
            .and_then(|id| self.dimensions.get(dimension)?.slot_of(id))
            .ok_or_else(|| DisjointSetError::not_found(dimension, element))
    }

    fn resolve_all(&self, ids: &RoaringBitmap) -> Vec<&E> {
        ids.iter().filter_map(|id| self.names.resolve(id)).collect()
    }

    fn classes_of(&self, table: &DimensionTable) -> Vec<Vec<&E>> {
        table
            .roots()
            .iter()
            .filter_map(|root| table.slot_of(root))
            .map(|slot| self.resolve_all(&table.node(slot).members))
            .collect()
    }
}

impl<E, D> DisjointSetCollection<E, D>
where
    E: Clone + Eq + Hash + Debug + Sync,
    D: Clone + Eq + Hash + Debug + Sync,
{
    /// Classes of every dimension, computed in parallel across dimensions.
    pub fn partitions(&self) -> FxHashMap<&D, Vec<Vec<&E>>> {
        self.dimensions
            .par_iter()
            .map(|(dimension, table)| (dimension, self.classes_of(table)))
            .collect()
    }
}
