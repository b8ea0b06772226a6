use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;

use crate::interner::{next_handle, ElementId};

/// Index of a node inside one dimension's arena.
pub(crate) type Slot = u32;

/// Per-(element, dimension) forest entry.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    /// Element this node stands for
    pub(crate) element: ElementId,

    /// Parent slot within the same dimension; `parent == self` marks a root
    pub(crate) parent: Slot,

    /// Class size. Only meaningful while the node is a root.
    pub(crate) size: u32,

    /// Class members, kept on roots only. An absorbed root hands its set to
    /// the survivor and is left holding an empty bitmap.
    pub(crate) members: RoaringBitmap,
}

/// Forest of one dimension: an arena of nodes addressed by slot, a map from
/// element handle to slot, and the root index.
///
/// Nodes are never removed from the arena, so a slot stays valid for the
/// life of the table and no parent pointer can dangle.
#[derive(Debug, Clone, Default)]
pub struct DimensionTable {
    pub(crate) nodes: Vec<Node>,
    slots: FxHashMap<ElementId, Slot>,
    /// Element handles of the current roots
    pub(crate) roots: RoaringBitmap,
}

impl DimensionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `element`, creating a self-rooted node of size 1
    /// if the element has none in this dimension yet.
    pub(crate) fn get_or_create_node(&mut self, element: ElementId) -> Slot {
        if let Some(&slot) = self.slots.get(&element) {
            return slot;
        }

        let slot = next_handle(self.nodes.len());
        let mut members = RoaringBitmap::new();
        members.insert(element);
        self.nodes.push(Node {
            element,
            parent: slot,
            size: 1,
            members,
        });
        self.slots.insert(element, slot);
        self.roots.insert(element);
        slot
    }

    pub(crate) fn slot_of(&self, element: ElementId) -> Option<Slot> {
        self.slots.get(&element).copied()
    }

    pub fn has_node(&self, element: ElementId) -> bool {
        self.slots.contains_key(&element)
    }

    #[inline]
    pub(crate) fn node(&self, slot: Slot) -> &Node {
        &self.nodes[slot as usize]
    }

    #[inline]
    pub(crate) fn element_at(&self, slot: Slot) -> ElementId {
        self.nodes[slot as usize].element
    }

    /// Number of nodes in this dimension.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current roots, as element handles.
    pub fn roots(&self) -> &RoaringBitmap {
        &self.roots
    }

    /// Number of equivalence classes.
    pub fn class_count(&self) -> usize {
        self.roots.len() as usize
    }
}
