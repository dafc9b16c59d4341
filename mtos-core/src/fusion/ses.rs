//! Smallest enclosing shape queries between two trees over the same domain.

use crate::tree::{ComponentTree, NodeId, NodeMap};

/// Lowest common ancestor of `a` and `b` in the tree described by `parent`
/// and `depth`.
pub(crate) fn lca(parent: &[NodeId], depth: &[usize], mut a: NodeId, mut b: NodeId) -> NodeId {
    while depth[b] > depth[a] {
        b = parent[b];
    }
    while depth[a] > depth[b] {
        a = parent[a];
    }
    while a != b {
        a = parent[a];
        b = parent[b];
    }
    a
}

/// For every node of `from`, the smallest node of `to` whose shape contains
/// it.
///
/// Pixels seed each `from` node with the `to` node they belong to, then a
/// bottom-up pass folds every child's answer into its parent with an LCA in
/// `to`. `to_depth` must be `to.compute_depth()`.
pub(crate) fn smallest_enclosing_shape<V, W>(
    from: &ComponentTree<V>,
    from_map: &NodeMap,
    to: &ComponentTree<W>,
    to_map: &NodeMap,
    to_depth: &[usize],
) -> Vec<NodeId> {
    let mut enclosing: Vec<Option<NodeId>> = vec![None; from.node_count()];
    let merge = |slot: &mut Option<NodeId>, node: NodeId| {
        *slot = Some(match *slot {
            Some(current) => lca(to.parents(), to_depth, current, node),
            None => node,
        });
    };

    for (&source, &target) in from_map.iter().zip(to_map.iter()) {
        merge(&mut enclosing[source], target);
    }
    for node in (1..from.node_count()).rev() {
        if let Some(target) = enclosing[node] {
            merge(&mut enclosing[from.parent(node)], target);
        }
    }

    enclosing
        .into_iter()
        .map(|target| target.unwrap_or(ComponentTree::<W>::ROOT))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        image::{Connectivity, Image2d},
        maxtree::build_maxtree,
    };

    #[test]
    fn lca_climbs_the_deeper_operand_first() {
        //      0
        //     / \
        //    1   2
        //    |
        //    3
        let parent = [0, 0, 0, 1];
        let depth = [0, 1, 1, 2];
        assert_eq!(lca(&parent, &depth, 3, 2), 0);
        assert_eq!(lca(&parent, &depth, 1, 3), 1);
        assert_eq!(lca(&parent, &depth, 3, 3), 3);
    }

    #[test]
    fn enclosing_shape_of_a_tree_in_itself_is_identity() {
        let image = Image2d::from_rows(vec![vec![3_u8, 1, 2], vec![3, 0, 2]]).expect("rows");
        let (tree, node_map) = build_maxtree(&image, Connectivity::C4).expect("non-empty");
        let depth = tree.compute_depth();
        let ses = smallest_enclosing_shape(&tree, &node_map, &tree, &node_map, &depth);
        assert_eq!(ses, (0..tree.node_count()).collect::<Vec<_>>());
    }

    #[test]
    fn split_shape_is_enclosed_by_the_common_ancestor() {
        // Two peaks in `left`, one plateau covering both in `right`.
        let left = Image2d::from_rows(vec![vec![2_u8, 0, 2]]).expect("rows");
        let right = Image2d::from_rows(vec![vec![1_u8, 1, 1]]).expect("rows");
        let (left_tree, left_map) = build_maxtree(&left, Connectivity::C4).expect("non-empty");
        let (right_tree, right_map) = build_maxtree(&right, Connectivity::C4).expect("non-empty");
        let depth = left_tree.compute_depth();
        let ses = smallest_enclosing_shape(&right_tree, &right_map, &left_tree, &left_map, &depth);
        assert_eq!(ses, [0]);
        let back = smallest_enclosing_shape(
            &left_tree,
            &left_map,
            &right_tree,
            &right_map,
            &right_tree.compute_depth(),
        );
        assert_eq!(back, [0, 0, 0]);
    }
}
