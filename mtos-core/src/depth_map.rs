//! Longest-path depths over the inclusion graph and their per-pixel image.

use std::collections::VecDeque;

use tracing::{debug, instrument, warn};

use crate::{
    error::{MtosError, Result},
    fusion::InclusionGraph,
    image::Image2d,
    tree::{ComponentTree, NodeMap, ensure_same_domain},
    value::DepthValue,
};

/// Length of the longest chain of enclosing shapes above every vertex.
///
/// Vertices are visited in topological order (root first) and each edge
/// relaxes `depth[child] = max(depth[child], depth[parent] + 1)`.
///
/// # Errors
/// Returns [`MtosError::CycleDetected`] when the graph is not acyclic.
pub fn vertex_depths(graph: &InclusionGraph) -> Result<Vec<usize>> {
    let vertices = graph.vertex_count();
    let children = graph.children();
    let mut pending: Vec<usize> = (0..vertices).map(|vertex| graph.parents(vertex).len()).collect();
    let mut ready: VecDeque<usize> = (0..vertices).filter(|&vertex| pending[vertex] == 0).collect();
    let mut depth = vec![0_usize; vertices];
    let mut visited = 0;

    while let Some(vertex) = ready.pop_front() {
        visited += 1;
        for &child in &children[vertex] {
            depth[child] = depth[child].max(depth[vertex] + 1);
            pending[child] -= 1;
            if pending[child] == 0 {
                ready.push_back(child);
            }
        }
    }

    if visited != vertices {
        return Err(MtosError::CycleDetected { visited, vertices });
    }
    Ok(depth)
}

/// Paints every pixel with the deepest vertex reached through any tree.
///
/// `trees` must be the trees `graph` was built from, in the same order.
///
/// # Errors
/// Returns [`MtosError::DepthOverflow`] before allocating the image when the
/// deepest vertex does not fit in `D`, [`MtosError::CycleDetected`] for a
/// cyclic graph and [`MtosError::DomainMismatch`] when node maps disagree.
///
/// # Examples
/// ```
/// use mtos_core::{Image2d, Point, build_inclusion_graph, build_tos, compute_depth_map};
///
/// let channel = Image2d::from_rows(vec![vec![0_u8, 0, 0], vec![0, 5, 0], vec![0, 0, 0]])?;
/// let trees = vec![build_tos(&channel, Point::new(0, 0))?];
/// let graph = build_inclusion_graph(&trees)?;
/// let depth = compute_depth_map::<u16, _>(&graph, &trees)?;
/// assert_eq!(depth[Point::new(2, 2)], 1);
/// assert_eq!(depth[Point::new(0, 0)], 0);
/// # Ok::<(), mtos_core::MtosError>(())
/// ```
#[instrument(
    name = "mtos.depth_map",
    level = "debug",
    err,
    skip(graph, trees),
    fields(vertices = graph.vertex_count())
)]
pub fn compute_depth_map<D, V>(
    graph: &InclusionGraph,
    trees: &[(ComponentTree<V>, NodeMap)],
) -> Result<Image2d<D>>
where
    D: DepthValue,
{
    let Some((_, reference)) = trees.first() else {
        return Err(MtosError::NoChannels);
    };
    for (channel, (_, node_map)) in trees.iter().enumerate().skip(1) {
        ensure_same_domain(reference, node_map, channel)?;
    }

    let depth = vertex_depths(graph)?;
    let deepest = depth.iter().copied().max().unwrap_or(0);
    if deepest > D::MAX_DEPTH {
        warn!(deepest, limit = D::MAX_DEPTH, "depth type too narrow for the inclusion graph");
        return Err(MtosError::DepthOverflow {
            depth: deepest,
            limit: D::MAX_DEPTH,
        });
    }
    let narrowed = depth
        .iter()
        .map(|&value| {
            D::try_from(value).map_err(|_| MtosError::DepthOverflow {
                depth: value,
                limit: D::MAX_DEPTH,
            })
        })
        .collect::<Result<Vec<D>>>()?;

    let mut image = Image2d::new(reference.domain(), D::default());
    for (tree, (_, node_map)) in trees.iter().enumerate() {
        let vertex_of = graph.tree_to_graph(tree);
        for (pixel, &node) in node_map.iter().enumerate() {
            let candidate = narrowed[vertex_of[node]];
            if candidate > image[pixel] {
                image[pixel] = candidate;
            }
        }
    }
    debug!(deepest, "depth map computed");
    Ok(image)
}
