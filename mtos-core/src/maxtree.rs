//! Max-tree construction by union-find flooding.
//!
//! The builder works on an explicit processing order `S` (root first, leaves
//! last). Pixels are merged in reverse order, then a forward pass over `S`
//! makes every pixel point to the canonical pixel of its node. Nodes are then
//! numbered by a depth-first flooding that starts at the first pixel of the
//! domain. The same steps back the tree of shapes, which only differs in the
//! way `S` and the keys are produced.

use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, instrument};

use crate::{
    error::Result,
    image::{Connectivity, Domain, Image2d},
    tree::{ComponentTree, NodeId, NodeMap},
    union_find::DisjointSet,
};

/// Builds the max-tree of `image`.
///
/// Pixels are stably sorted by increasing value; ties keep domain order.
/// Node `0` is the root and every node is numbered after its parent, in the
/// order a depth-first flooding from the top-left pixel reaches the nodes.
///
/// # Errors
/// Returns [`crate::MtosError::EmptyDomain`] for an empty image.
///
/// # Examples
/// ```
/// use mtos_core::{Connectivity, Image2d, build_maxtree};
///
/// let image = Image2d::from_rows(vec![
///     vec![5_u8, 5, 3],
///     vec![5, 5, 3],
///     vec![1, 1, 1],
/// ])?;
/// let (tree, node_map) = build_maxtree(&image, Connectivity::C4)?;
/// assert_eq!(tree.parents(), [0, 0, 1]);
/// assert_eq!(tree.values(), [1, 3, 5]);
/// assert_eq!(tree.reconstruct(&node_map), image);
/// # Ok::<(), mtos_core::MtosError>(())
/// ```
#[instrument(
    name = "mtos.maxtree",
    level = "debug",
    err,
    skip(image),
    fields(domain = %image.domain())
)]
pub fn build_maxtree<V>(
    image: &Image2d<V>,
    connectivity: Connectivity,
) -> Result<(ComponentTree<V>, NodeMap)>
where
    V: Copy + Ord,
{
    let domain = image.domain();
    domain.ensure_non_empty()?;
    let keys = image.as_slice();
    let mut order: Vec<usize> = (0..domain.len()).collect();
    order.sort_by_key(|&pixel| keys[pixel]);

    let mut parent = flood(domain, connectivity, &order);
    canonicalize(keys, &mut parent, &order);
    let (tree, node_map) = into_tree(domain, connectivity, keys, &parent, order[0], |&key| key);
    debug!(nodes = tree.node_count(), "max-tree built");
    Ok((tree, node_map))
}

/// Union-find pass over `reverse(order)`.
///
/// Returns one parent pixel per pixel. Every pixel processed later in the
/// reverse scan adopts the current top of each already-processed
/// neighbouring component, and `order[0]` ends up as its own parent.
pub(crate) fn flood(domain: Domain, connectivity: Connectivity, order: &[usize]) -> Vec<usize> {
    let mut parent = vec![0; domain.len()];
    let mut sets = DisjointSet::new(domain.len());
    for &pixel in order.iter().rev() {
        parent[pixel] = pixel;
        sets.make_set(pixel);
        for neighbor in connectivity.neighbors(domain, pixel) {
            if !sets.is_set(neighbor) {
                continue;
            }
            let other = sets.find(neighbor);
            let own = sets.find(pixel);
            if other != own {
                parent[sets.component_node[other]] = pixel;
                sets.union(own, other, pixel);
            }
        }
    }
    parent
}

/// Points every pixel at the canonical pixel of its node.
///
/// A pixel is canonical when it is the root or its parent carries a
/// different key. Applying the pass twice is the same as applying it once.
pub(crate) fn canonicalize<K: PartialEq>(keys: &[K], parent: &mut [usize], order: &[usize]) {
    for &pixel in order {
        let up = parent[pixel];
        if keys[parent[up]] == keys[up] {
            parent[pixel] = parent[up];
        }
    }
}

/// Numbers the nodes of a canonical parent image and builds the node map.
///
/// Nodes are taken in [`discovery_order`]. A node reached before its parent
/// pulls its unnumbered ancestors in first, top-down, so `parent[n] < n`.
pub(crate) fn into_tree<K, V, F>(
    domain: Domain,
    connectivity: Connectivity,
    keys: &[K],
    parent: &[usize],
    root: usize,
    mut value_of: F,
) -> (ComponentTree<V>, NodeMap)
where
    K: Copy + Ord,
    F: FnMut(&K) -> V,
{
    const UNNUMBERED: NodeId = NodeId::MAX;
    let mut node_of = vec![UNNUMBERED; parent.len()];
    let mut node_parent = Vec::new();
    let mut values = Vec::new();
    let mut chain = Vec::new();
    for first in discovery_order(domain, connectivity, keys, parent, root) {
        let mut pixel = first;
        while node_of[pixel] == UNNUMBERED {
            chain.push(pixel);
            if pixel == root {
                break;
            }
            pixel = parent[pixel];
        }
        while let Some(pixel) = chain.pop() {
            node_of[pixel] = values.len();
            node_parent.push(if pixel == root {
                ComponentTree::<V>::ROOT
            } else {
                node_of[parent[pixel]]
            });
            values.push(value_of(&keys[pixel]));
        }
    }

    let nodes = (0..parent.len())
        .map(|pixel| match node_of[pixel] {
            UNNUMBERED => node_of[parent[pixel]],
            node => node,
        })
        .collect();
    let node_map = Image2d::from_parts(domain, nodes);
    (ComponentTree::from_parts(node_parent, values), node_map)
}

/// Lists the canonical pixels in the order a depth-first flooding opens
/// their nodes.
///
/// The flooding starts at pixel `0`, keeps one FIFO queue per key and always
/// works on the front of the highest non-empty queue. Meeting a higher key
/// opens that node and moves there at once; the interrupted pixel resumes
/// later. Dropping to a lower key closes the current node and opens its
/// parent unless the parent is already open.
fn discovery_order<K: Copy + Ord>(
    domain: Domain,
    connectivity: Connectivity,
    keys: &[K],
    parent: &[usize],
    root: usize,
) -> Vec<usize> {
    let canonical = |pixel: usize| {
        if pixel == root || keys[parent[pixel]] != keys[pixel] {
            pixel
        } else {
            parent[pixel]
        }
    };
    let mut seen = vec![false; keys.len()];
    let mut queues: BTreeMap<K, VecDeque<usize>> = BTreeMap::new();
    let mut open = Vec::new();
    let mut opened = Vec::new();

    seen[0] = true;
    queues.entry(keys[0]).or_default().push_back(0);
    open.push(canonical(0));
    opened.push(canonical(0));

    'flood: while let Some((level, pixel)) = highest(&queues) {
        for neighbor in connectivity.neighbors(domain, pixel) {
            if seen[neighbor] {
                continue;
            }
            seen[neighbor] = true;
            queues.entry(keys[neighbor]).or_default().push_back(neighbor);
            if keys[neighbor] > level {
                let node = canonical(neighbor);
                open.push(node);
                opened.push(node);
                continue 'flood;
            }
        }

        if let Some(mut queue) = queues.last_entry() {
            queue.get_mut().pop_front();
            if queue.get().is_empty() {
                queue.remove();
            }
        }
        let dropped = highest(&queues).is_some_and(|(next, _)| next < level);
        if dropped {
            if let Some(closed) = open.pop() {
                let up = parent[closed];
                if open.last() != Some(&up) {
                    open.push(up);
                    opened.push(up);
                }
            }
        }
    }
    opened
}

fn highest<K: Copy + Ord>(queues: &BTreeMap<K, VecDeque<usize>>) -> Option<(K, usize)> {
    queues
        .last_key_value()
        .and_then(|(&key, queue)| queue.front().map(|&pixel| (key, pixel)))
}
