/// Union-Find core for one dimension
///
/// Full path compression on every lookup and union by class size. All
/// operations work on slots of a single `DimensionTable`, so no call can
/// reach into another dimension's forest.
use super::table::{DimensionTable, Slot};
use crate::interner::ElementId;

/// Outcome of a union that actually merged two classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Merge {
    /// Element of the root that survived
    pub(crate) survivor: ElementId,
    /// Element of the root that was attached under the survivor
    pub(crate) absorbed: ElementId,
    /// Size of the merged class
    pub(crate) size: u32,
}

impl DimensionTable {
    /// Find the root of the tree containing `slot`, with full path compression
    ///
    /// Two passes: the first walks to the root, the second repoints every
    /// node visited on the way directly at it. Class membership is unchanged.
    ///
    /// # Arguments
    /// * `slot` - Slot to find the root for
    ///
    /// # Returns
    /// Slot of the root
    ///
    /// # Complexity
    /// O(α(n)) amortised, where α is the inverse Ackermann function
    pub(crate) fn find(&mut self, slot: Slot) -> Slot {
        debug_assert!((slot as usize) < self.nodes.len(), "slot out of bounds");

        let mut root = slot;
        loop {
            let parent = self.nodes[root as usize].parent;
            if parent == root {
                break;
            }
            root = parent;
        }

        let mut current = slot;
        while current != root {
            let next = self.nodes[current as usize].parent;
            self.nodes[current as usize].parent = root;
            current = next;
        }

        root
    }

    /// Union the classes containing `a` and `b`
    ///
    /// The root of the larger class survives. On equal sizes `a`'s root
    /// survives. The survivor takes over the absorbed root's size and member
    /// set, and the absorbed root leaves the root index in the same call.
    ///
    /// # Arguments
    /// * `a` - Slot from the first class
    /// * `b` - Slot from the second class
    ///
    /// # Returns
    /// `Some(Merge)` if two classes were merged, `None` if they were already one
    ///
    /// # Complexity
    /// O(α(n)) amortised for the root lookups, plus the member-set merge
    pub(crate) fn union(&mut self, a: Slot, b: Slot) -> Option<Merge> {
        let root_a = self.find(a);
        let root_b = self.find(b);

        if root_a == root_b {
            return None;
        }

        let (survivor, absorbed) =
            if self.nodes[root_a as usize].size >= self.nodes[root_b as usize].size {
                (root_a, root_b)
            } else {
                (root_b, root_a)
            };

        let absorbed_node = &mut self.nodes[absorbed as usize];
        absorbed_node.parent = survivor;
        let absorbed_size = absorbed_node.size;
        let absorbed_members = std::mem::take(&mut absorbed_node.members);
        let absorbed_element = absorbed_node.element;

        let survivor_node = &mut self.nodes[survivor as usize];
        survivor_node.size += absorbed_size;
        survivor_node.members |= absorbed_members;
        let merged_size = survivor_node.size;
        let survivor_element = survivor_node.element;

        self.roots.remove(absorbed_element);

        Some(Merge {
            survivor: survivor_element,
            absorbed: absorbed_element,
            size: merged_size,
        })
    }

    /// Check if two slots are in the same class
    #[inline]
    pub(crate) fn connected(&mut self, a: Slot, b: Slot) -> bool {
        self.find(a) == self.find(b)
    }

    /// Depth of `slot` below its root, without compressing.
    pub(crate) fn depth(&self, mut slot: Slot) -> usize {
        let mut depth = 0;
        loop {
            let parent = self.nodes[slot as usize].parent;
            if parent == slot {
                return depth;
            }
            depth += 1;
            slot = parent;
        }
    }
}
