//! Union-find (disjoint set union) used while flooding component trees.
//!
//! Sets are created lazily with [`DisjointSet::make_set`] as the flooding pass
//! reaches each pixel, so the structure also answers "has this pixel been
//! processed yet?". Each set remembers a representative pixel in
//! `component_node`: the pixel that currently tops the component in the tree
//! being built, independent of which element union-by-rank picked as the set
//! root.

const UNSET: usize = usize::MAX;

#[derive(Clone, Debug)]
pub(crate) struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    pub(crate) component_node: Vec<usize>,
}

impl DisjointSet {
    /// Allocates `n` elements, none of which belongs to a set yet.
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: vec![UNSET; n],
            rank: vec![0; n],
            component_node: vec![UNSET; n],
        }
    }

    pub(crate) fn make_set(&mut self, node: usize) {
        self.parent[node] = node;
        self.rank[node] = 0;
        self.component_node[node] = node;
    }

    pub(crate) fn is_set(&self, node: usize) -> bool {
        self.parent[node] != UNSET
    }

    /// Returns the set root of `node`, compressing the path behind it.
    ///
    /// # Panics
    /// Panics when `node` was never passed to [`Self::make_set`].
    pub(crate) fn find(&mut self, mut node: usize) -> usize {
        assert!(self.is_set(node), "find on node {node} before make_set");
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    /// Merges the sets rooted at `left` and `right` and returns the new root.
    /// The merged set's representative is `representative`.
    pub(crate) fn union(&mut self, left: usize, right: usize, representative: usize) -> usize {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left != right {
            let left_rank = self.rank[left];
            let right_rank = self.rank[right];
            if left_rank < right_rank {
                std::mem::swap(&mut left, &mut right);
            }
            self.parent[right] = left;
            if left_rank == right_rank {
                self.rank[left] = left_rank.saturating_add(1);
            }
        }
        self.component_node[left] = representative;
        left
    }
}
