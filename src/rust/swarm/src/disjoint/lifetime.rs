//! Node lifetime management.
//!
//! Every node lives in its dimension's arena until the whole dimension is
//! released, so ancestors can never be freed under a descendant. What gets
//! reclaimed early is class payload: an absorbed root gives up its member
//! set at merge time, and `flatten` repoints every node straight at its root
//! so no intermediate ancestor is left on any path.

use super::table::{DimensionTable, Slot};

/// Shape of one dimension's forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForestStats {
    /// Nodes in the arena
    pub nodes: usize,
    /// Equivalence classes (roots)
    pub classes: usize,
    /// Longest parent chain from any node to its root
    pub max_depth: usize,
    /// Nodes still holding a non-empty member set
    pub member_sets: usize,
}

impl DimensionTable {
    /// Compress every path in the forest so each node points directly at its
    /// root. Returns the number of parent pointers that were rewritten.
    pub(crate) fn flatten(&mut self) -> usize {
        let mut rewritten = 0;
        for slot in 0..self.nodes.len() as Slot {
            let before = self.nodes[slot as usize].parent;
            let root = self.find(slot);
            if before != root {
                rewritten += 1;
            }
        }
        rewritten
    }

    pub(crate) fn stats(&self) -> ForestStats {
        let max_depth = (0..self.nodes.len() as Slot)
            .map(|slot| self.depth(slot))
            .max()
            .unwrap_or(0);
        let member_sets = self
            .nodes
            .iter()
            .filter(|node| !node.members.is_empty())
            .count();

        ForestStats {
            nodes: self.nodes.len(),
            classes: self.class_count(),
            max_depth,
            member_sets,
        }
    }
}
