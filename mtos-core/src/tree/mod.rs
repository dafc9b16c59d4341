//! Component trees stored as flat parent/value arrays.
//!
//! Nodes are plain indices. Node `0` is the root and is its own parent; every
//! other node `n` satisfies `parent[n] < n`, so a forward scan visits parents
//! before children and a reverse scan visits children before parents. The
//! [`NodeMap`] links every pixel to the smallest node containing it.

mod attribute;
mod filter;

use crate::{
    error::{MtosError, Result},
    image::Image2d,
};

pub use self::{
    attribute::{Accumulator, Count, Max, Mean, Min, Sum},
    filter::FilterPolicy,
};

/// Index of a node inside a [`ComponentTree`].
pub type NodeId = usize;

/// Pixel to node association of a component tree.
pub type NodeMap = Image2d<NodeId>;

/// A component tree with one value (level) per node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComponentTree<V> {
    parent: Vec<NodeId>,
    values: Vec<V>,
}

impl<V> ComponentTree<V> {
    /// Identifier of the root node.
    pub const ROOT: NodeId = 0;

    pub(crate) fn from_parts(parent: Vec<NodeId>, values: Vec<V>) -> Self {
        debug_assert_eq!(parent.len(), values.len());
        debug_assert!(parent.first().is_none_or(|&root| root == Self::ROOT));
        debug_assert!(
            parent
                .iter()
                .enumerate()
                .skip(1)
                .all(|(node, &par)| par < node)
        );
        Self { parent, values }
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.parent.len()
    }

    /// Parent of `node`; the root is its own parent.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> NodeId {
        self.parent[node]
    }

    /// The whole parent array.
    #[must_use]
    pub fn parents(&self) -> &[NodeId] {
        &self.parent
    }

    /// Level of `node`.
    #[must_use]
    pub fn value(&self, node: NodeId) -> &V {
        &self.values[node]
    }

    /// Levels of every node.
    #[must_use]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Depth of every node; the root has depth 0.
    ///
    /// # Examples
    /// ```
    /// use mtos_core::{Connectivity, Image2d, build_maxtree};
    ///
    /// let image = Image2d::from_rows(vec![vec![1_u8, 2, 3]])?;
    /// let (tree, _) = build_maxtree(&image, Connectivity::C4)?;
    /// assert_eq!(tree.compute_depth(), [0, 1, 2]);
    /// # Ok::<(), mtos_core::MtosError>(())
    /// ```
    #[must_use]
    pub fn compute_depth(&self) -> Vec<usize> {
        let mut depth = vec![0; self.parent.len()];
        for node in 1..self.parent.len() {
            depth[node] = depth[self.parent[node]] + 1;
        }
        depth
    }

    /// Children lists of every node, in increasing node order.
    #[must_use]
    pub fn children(&self) -> Vec<Vec<NodeId>> {
        let mut children = vec![Vec::new(); self.parent.len()];
        for (node, &par) in self.parent.iter().enumerate().skip(1) {
            children[par].push(node);
        }
        children
    }

    /// Paints every pixel with the attribute of its node.
    ///
    /// `values` must hold one entry per node, for instance the output of
    /// [`Self::compute_attribute_on_values`].
    #[must_use]
    pub fn reconstruct_from<W: Clone>(&self, node_map: &NodeMap, values: &[W]) -> Image2d<W> {
        debug_assert_eq!(values.len(), self.parent.len());
        node_map.map(|&node| values[node].clone())
    }

    pub(crate) fn check_node_map(&self, node_map: &NodeMap) -> Result<()> {
        node_map.domain().ensure_non_empty()?;
        debug_assert!(node_map.iter().all(|&node| node < self.parent.len()));
        Ok(())
    }
}

impl<V: Clone> ComponentTree<V> {
    /// Paints every pixel with the level of its node.
    ///
    /// For an unfiltered max-tree this reproduces the input image.
    #[must_use]
    pub fn reconstruct(&self, node_map: &NodeMap) -> Image2d<V> {
        self.reconstruct_from(node_map, &self.values)
    }
}

pub(crate) fn ensure_same_domain<T, U>(
    reference: &Image2d<T>,
    other: &Image2d<U>,
    channel: usize,
) -> Result<()> {
    if reference.domain() != other.domain() {
        return Err(MtosError::DomainMismatch {
            channel,
            expected: reference.domain(),
            found: other.domain(),
        });
    }
    Ok(())
}
