//! Local resource engine state: the configured resource groups of one node.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use crate::collection::DisjointSetCollection;
use crate::config::SwarmConfig;
use crate::disjoint::DisjointSetError;
use crate::hash::HashError;
use crate::key::Key;

/// Algorithm used for the per-dimension fingerprints in summaries.
pub const FINGERPRINT_ALGORITHM: &str = "blake3";

/// One class of a dimension, as shown in summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSummary {
    pub root: String,
    /// Sorted by name
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSummary {
    pub dimension: Key,
    pub classes: Vec<ClassSummary>,
    pub fingerprint: String,
}

/// Resource groups loaded from `[[group]]` entries.
///
/// Each entry merges its members into one class of its dimension; entries
/// sharing a member end up in the same class.
#[derive(Debug)]
pub struct LocalEngine {
    config: SwarmConfig,
    groups: DisjointSetCollection<String, Key>,
}

impl LocalEngine {
    /// Build the engine from `config`. A group without members is rejected.
    pub fn new(config: SwarmConfig) -> Result<Self, DisjointSetError> {
        let mut groups = DisjointSetCollection::new();
        for group in &config.groups {
            let root = groups.make_set(&group.dimension, group.members.iter().map(String::as_str))?;
            log::debug!(
                "group in dimension {} rooted at {:?}",
                group.dimension,
                groups.element(root)
            );
        }
        log::info!(
            "loaded {} groups over {} resources",
            config.groups.len(),
            groups.len()
        );
        Ok(Self { config, groups })
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn groups(&self) -> &DisjointSetCollection<String, Key> {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut DisjointSetCollection<String, Key> {
        &mut self.groups
    }

    /// Classes of every dimension, dimensions in key order.
    pub fn summary(&self) -> Result<Vec<DimensionSummary>, HashError> {
        let mut dimensions: Vec<&Key> = self.groups.dimensions().collect();
        dimensions.sort();

        dimensions
            .into_iter()
            .map(|dimension| {
                let roots = self.groups.get_roots(dimension);
                let classes = self
                    .groups
                    .classes(dimension)
                    .into_iter()
                    .zip(roots)
                    .map(|(members, root)| {
                        let mut members: Vec<String> = members.into_iter().cloned().collect();
                        members.sort();
                        ClassSummary {
                            root: root.clone(),
                            members,
                        }
                    })
                    .collect();
                Ok(DimensionSummary {
                    dimension: dimension.clone(),
                    classes,
                    fingerprint: self
                        .groups
                        .partition_digest_hex(dimension, FINGERPRINT_ALGORITHM)?,
                })
            })
            .collect()
    }

    /// `Dimension | Root | Members` table with one row per class.
    pub fn render_table(&self) -> Result<Table, HashError> {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Dimension", "Root", "Members"]);

        for dimension in self.summary()? {
            for class in &dimension.classes {
                table.add_row(vec![
                    dimension.dimension.to_string(),
                    class.root.clone(),
                    class.members.join(", "),
                ]);
            }
        }
        Ok(table)
    }
}
