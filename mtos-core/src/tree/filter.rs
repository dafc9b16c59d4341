//! Node filtering with the classic connected-filter policies.

use tracing::debug;

use super::{ComponentTree, NodeId, NodeMap};
use crate::error::{MtosError, Result};

/// How a failing predicate propagates through the tree.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum FilterPolicy {
    /// A node survives only if it and every ancestor pass.
    Min,
    /// A node survives if it or any descendant passes.
    Max,
    /// A node survives exactly when it passes.
    #[default]
    Direct,
}

impl<V: Clone> ComponentTree<V> {
    /// Removes the nodes rejected by `predicate` under `policy`.
    ///
    /// `predicate` is called once per node, in increasing node order. Pixels
    /// owned by a removed node are reassigned to its nearest surviving
    /// ancestor. The returned tree keeps the surviving nodes in their original
    /// relative order, so it satisfies the same numbering invariants as
    /// `self`, which is left untouched.
    ///
    /// # Errors
    /// Returns [`MtosError::RootRemoval`] when `predicate` rejects the root
    /// and [`MtosError::EmptyDomain`] for an empty node map.
    ///
    /// # Examples
    /// ```
    /// use mtos_core::{Connectivity, Count, FilterPolicy, Image2d, build_maxtree};
    ///
    /// let image = Image2d::from_rows(vec![vec![0_u8, 1, 1], vec![0, 0, 2]])?;
    /// let (tree, node_map) = build_maxtree(&image, Connectivity::C4)?;
    /// let area = tree.compute_attribute_on_points(&node_map, Count::default())?;
    /// let (filtered, filtered_map) =
    ///     tree.filter(FilterPolicy::Direct, &node_map, |node| area[node] >= 2)?;
    /// assert_eq!(filtered.node_count(), 2);
    /// assert_eq!(filtered.reconstruct(&filtered_map).as_slice(), [0, 1, 1, 0, 0, 1]);
    /// # Ok::<(), mtos_core::MtosError>(())
    /// ```
    pub fn filter<P>(
        &self,
        policy: FilterPolicy,
        node_map: &NodeMap,
        predicate: P,
    ) -> Result<(Self, NodeMap)>
    where
        P: FnMut(NodeId) -> bool,
    {
        self.check_node_map(node_map)?;
        let passes: Vec<bool> = (0..self.node_count()).map(predicate).collect();
        if !passes[Self::ROOT] {
            return Err(MtosError::RootRemoval);
        }

        let keep = self.survivors(policy, passes);

        // Nearest surviving ancestor, the node itself included.
        let mut anchor: Vec<NodeId> = Vec::with_capacity(keep.len());
        let mut new_id = vec![0; keep.len()];
        let mut parent = Vec::new();
        let mut values = Vec::new();
        for (node, &kept) in keep.iter().enumerate() {
            let above = if node == Self::ROOT {
                Self::ROOT
            } else {
                anchor[self.parent(node)]
            };
            if kept {
                new_id[node] = values.len();
                parent.push(new_id[above]);
                values.push(self.values[node].clone());
                anchor.push(node);
            } else {
                anchor.push(above);
            }
        }

        debug!(
            ?policy,
            before = self.node_count(),
            after = values.len(),
            "filtered component tree"
        );
        let filtered_map = node_map.map(|&node| new_id[anchor[node]]);
        Ok((Self::from_parts(parent, values), filtered_map))
    }

    fn survivors(&self, policy: FilterPolicy, passes: Vec<bool>) -> Vec<bool> {
        match policy {
            FilterPolicy::Direct => passes,
            FilterPolicy::Min => {
                let mut keep = passes;
                for node in 1..keep.len() {
                    keep[node] = keep[node] && keep[self.parent(node)];
                }
                keep
            }
            FilterPolicy::Max => {
                let mut keep = passes;
                for node in (1..keep.len()).rev() {
                    if keep[node] {
                        keep[self.parent(node)] = true;
                    }
                }
                keep
            }
        }
    }
}
