//! Fusion of several component trees into one inclusion graph.
//!
//! Every distinct shape of every input tree becomes one vertex. Edges point
//! from a shape towards the shapes directly enclosing it, so vertex `0` (the
//! shared root) is the unique sink. Shapes are matched across trees with
//! smallest-enclosing-shape (SES) round trips: a node whose SES in another
//! tree maps straight back to it describes the same pixel set.

mod ses;

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::{
    error::{MtosError, Result},
    tree::{ComponentTree, NodeId, NodeMap, ensure_same_domain},
};

use self::ses::smallest_enclosing_shape;

/// Index of a vertex inside an [`InclusionGraph`].
pub type VertexId = usize;

/// Transitively reduced DAG of the shapes of several trees.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InclusionGraph {
    parents: Vec<BTreeSet<VertexId>>,
    tree_to_graph: Vec<Vec<VertexId>>,
    graph_to_tree: Vec<Vec<Option<NodeId>>>,
    vertex_depths: Vec<Vec<usize>>,
}

impl InclusionGraph {
    /// Identifier of the vertex shared by every root.
    pub const ROOT: VertexId = 0;

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.parents.len()
    }

    /// Number of fused trees.
    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.tree_to_graph.len()
    }

    /// Vertices directly enclosing `vertex`, in increasing order.
    #[must_use]
    pub fn parents(&self, vertex: VertexId) -> &BTreeSet<VertexId> {
        &self.parents[vertex]
    }

    /// Total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.parents.iter().map(BTreeSet::len).sum()
    }

    /// Vertex of every node of tree `tree`.
    #[must_use]
    pub fn tree_to_graph(&self, tree: usize) -> &[VertexId] {
        &self.tree_to_graph[tree]
    }

    /// Node of tree `tree` describing each vertex, when that tree has one.
    #[must_use]
    pub fn graph_to_tree(&self, tree: usize) -> &[Option<NodeId>] {
        &self.graph_to_tree[tree]
    }

    /// Depth, in tree `tree`, of the smallest shape enclosing each vertex.
    #[must_use]
    pub fn vertex_depths(&self, tree: usize) -> &[usize] {
        &self.vertex_depths[tree]
    }

    /// Children lists of every vertex, the transpose of [`Self::parents`].
    #[must_use]
    pub fn children(&self) -> Vec<Vec<VertexId>> {
        let mut children = vec![Vec::new(); self.parents.len()];
        for (vertex, parents) in self.parents.iter().enumerate() {
            for &parent in parents {
                children[parent].push(vertex);
            }
        }
        children
    }

    /// Graph with the given edges and no trees behind it.
    #[cfg(test)]
    pub(crate) fn from_parents(parents: Vec<BTreeSet<VertexId>>) -> Self {
        Self {
            parents,
            tree_to_graph: Vec::new(),
            graph_to_tree: Vec::new(),
            vertex_depths: Vec::new(),
        }
    }

    /// Returns whether `a` lies strictly deeper than `b` in every tree.
    fn dominates(&self, a: VertexId, b: VertexId) -> bool {
        self.vertex_depths
            .iter()
            .all(|depths| depths[a] > depths[b])
    }
}

/// Fuses `trees` into their inclusion graph.
///
/// Tree 0 seeds the graph: each of its non-root nodes gets a fresh vertex.
/// The nodes of every later tree either reuse the vertex of an equal shape
/// found in an earlier tree or get a fresh one, trees and nodes being taken
/// in index order. All node maps must cover the same domain.
///
/// # Errors
/// Returns [`MtosError::NoChannels`] without trees,
/// [`MtosError::DomainMismatch`] when node maps disagree on their domain,
/// and [`MtosError::SesRoundTrip`] or [`MtosError::MissingSink`] when the
/// trees are not valid component trees of their node maps.
///
/// # Examples
/// ```
/// use mtos_core::{Image2d, Point, build_inclusion_graph, build_tos};
///
/// let red = Image2d::from_rows(vec![vec![0_u8, 9, 9], vec![0, 0, 0]])?;
/// let green = Image2d::from_rows(vec![vec![0_u8, 0, 9], vec![0, 0, 0]])?;
/// let trees = vec![build_tos(&red, Point::new(1, 0))?, build_tos(&green, Point::new(1, 0))?];
/// let graph = build_inclusion_graph(&trees)?;
/// // Root, the red pair and the green pixel nested inside it.
/// assert_eq!(graph.vertex_count(), 3);
/// assert_eq!(graph.tree_to_graph(1), [0, 2]);
/// assert!(graph.parents(2).contains(&1));
/// # Ok::<(), mtos_core::MtosError>(())
/// ```
#[instrument(
    name = "mtos.inclusion_graph",
    level = "debug",
    err,
    skip(trees),
    fields(trees = trees.len())
)]
pub fn build_inclusion_graph<V>(trees: &[(ComponentTree<V>, NodeMap)]) -> Result<InclusionGraph> {
    let Some((_, reference)) = trees.first() else {
        return Err(MtosError::NoChannels);
    };
    for (channel, (_, node_map)) in trees.iter().enumerate().skip(1) {
        ensure_same_domain(reference, node_map, channel)?;
    }
    reference.domain().ensure_non_empty()?;

    let depths: Vec<Vec<usize>> = trees.iter().map(|(tree, _)| tree.compute_depth()).collect();
    let ses = enclosing_shapes(trees, &depths)?;

    let count = trees.len();
    let mut graph = InclusionGraph {
        parents: vec![BTreeSet::new()],
        tree_to_graph: trees
            .iter()
            .map(|(tree, _)| vec![InclusionGraph::ROOT; tree.node_count()])
            .collect(),
        graph_to_tree: vec![vec![Some(ComponentTree::<V>::ROOT)]; count],
        vertex_depths: vec![vec![0]; count],
    };

    for (i, (tree, _)) in trees.iter().enumerate() {
        for node in 1..tree.node_count() {
            let existing = (0..i).find_map(|j| {
                let other = ses[i][j][node];
                (ses[j][i][other] == node).then(|| graph.tree_to_graph[j][other])
            });
            let vertex = match existing {
                Some(vertex) => vertex,
                None => {
                    let vertex = graph.parents.len();
                    graph.parents.push(BTreeSet::new());
                    for j in 0..count {
                        graph.vertex_depths[j].push(depths[j][ses[i][j][node]]);
                        graph.graph_to_tree[j].push(None);
                    }
                    vertex
                }
            };
            graph.tree_to_graph[i][node] = vertex;
            graph.graph_to_tree[i][vertex] = Some(node);
        }
    }

    for (i, (tree, _)) in trees.iter().enumerate() {
        for node in 1..tree.node_count() {
            let vertex = graph.tree_to_graph[i][node];
            let local_parent = graph.tree_to_graph[i][tree.parent(node)];
            graph.parents[vertex].insert(local_parent);
            for j in (0..count).filter(|&j| j != i) {
                let other = ses[i][j][node];
                if ses[j][i][other] != node {
                    let enclosing = graph.tree_to_graph[j][other];
                    graph.parents[vertex].insert(enclosing);
                }
            }
        }
    }

    let edges = graph.edge_count();
    reduce(&mut graph);
    let orphan = (1..graph.vertex_count()).find(|&vertex| graph.parents[vertex].is_empty());
    if let Some(vertex) = orphan {
        return Err(MtosError::MissingSink { vertex });
    }
    debug!(
        vertices = graph.vertex_count(),
        edges_before = edges,
        edges_after = graph.edge_count(),
        "inclusion graph built"
    );
    Ok(graph)
}

/// SES tables `ses[i][j][n]`, identity when `i == j`, validated by round trip.
fn enclosing_shapes<V>(
    trees: &[(ComponentTree<V>, NodeMap)],
    depths: &[Vec<usize>],
) -> Result<Vec<Vec<Vec<NodeId>>>> {
    let ses: Vec<Vec<Vec<NodeId>>> = trees
        .iter()
        .enumerate()
        .map(|(i, (from, from_map))| {
            trees
                .iter()
                .enumerate()
                .map(|(j, (to, to_map))| {
                    if i == j {
                        (0..from.node_count()).collect()
                    } else {
                        smallest_enclosing_shape(from, from_map, to, to_map, &depths[j])
                    }
                })
                .collect()
        })
        .collect();

    for (i, row) in ses.iter().enumerate() {
        for (j, forward) in row.iter().enumerate().filter(|&(j, _)| j != i) {
            for (node, &other) in forward.iter().enumerate() {
                let returned = ses[j][i][other];
                if depths[i][returned] > depths[i][node] {
                    return Err(MtosError::SesRoundTrip {
                        tree: i,
                        node,
                        other: j,
                        returned,
                    });
                }
            }
        }
    }
    Ok(ses)
}

/// Drops every edge `v -> b` for which another edge `v -> a` exists with `a`
/// strictly deeper than `b` in every tree.
fn reduce(graph: &mut InclusionGraph) {
    for vertex in 0..graph.vertex_count() {
        let redundant: Vec<VertexId> = graph.parents[vertex]
            .iter()
            .copied()
            .filter(|&b| {
                graph.parents[vertex]
                    .iter()
                    .any(|&a| a != b && graph.dominates(a, b))
            })
            .collect();
        for b in redundant {
            graph.parents[vertex].remove(&b);
        }
    }
}

#[cfg(test)]
mod tests;
