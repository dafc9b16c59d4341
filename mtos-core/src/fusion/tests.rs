use std::collections::{BTreeSet, HashMap, hash_map::Entry};

use proptest::prelude::*;

use super::*;
use crate::{
    image::{Domain, Image2d, Point},
    tos::build_tos,
};

fn trees_of(channels: &[Image2d<u8>]) -> Vec<(ComponentTree<u8>, NodeMap)> {
    channels
        .iter()
        .map(|channel| build_tos(channel, Point::new(0, 0)).expect("valid channel"))
        .collect()
}

fn pixel_sets<V>(tree: &ComponentTree<V>, node_map: &NodeMap) -> Vec<BTreeSet<usize>> {
    let mut sets = vec![BTreeSet::new(); tree.node_count()];
    for (pixel, &node) in node_map.iter().enumerate() {
        sets[node].insert(pixel);
    }
    for node in (1..tree.node_count()).rev() {
        let own = std::mem::take(&mut sets[node]);
        sets[tree.parent(node)].extend(own.iter().copied());
        sets[node] = own;
    }
    sets
}

#[test]
fn single_tree_maps_nodes_one_to_one() {
    let channel = Image2d::from_rows(vec![vec![0_u8, 4, 0], vec![0, 8, 0]]).expect("rows");
    let trees = trees_of(&[channel]);
    let graph = build_inclusion_graph(&trees).expect("one tree");
    let tree = &trees[0].0;
    assert_eq!(graph.vertex_count(), tree.node_count());
    assert_eq!(graph.tree_to_graph(0), (0..tree.node_count()).collect::<Vec<_>>());
    for node in 1..tree.node_count() {
        assert_eq!(graph.parents(node).iter().copied().collect::<Vec<_>>(), [tree.parent(node)]);
    }
}

#[test]
fn identical_channels_share_every_vertex() {
    let channel = Image2d::from_rows(vec![vec![3_u8, 1, 2], vec![0, 2, 1]]).expect("rows");
    let trees = trees_of(&[channel.clone(), channel]);
    let graph = build_inclusion_graph(&trees).expect("two trees");
    assert_eq!(graph.tree_to_graph(0), graph.tree_to_graph(1));
    assert_eq!(graph.vertex_count(), trees[0].0.node_count());
    assert!(graph.graph_to_tree(1).iter().all(Option::is_some));
}

#[test]
fn crossing_shapes_get_distinct_vertices_with_a_common_sink() {
    let left =
        Image2d::from_rows(vec![vec![0_u8, 0, 0], vec![9, 9, 0], vec![0, 0, 0]]).expect("rows");
    let right =
        Image2d::from_rows(vec![vec![0_u8, 0, 0], vec![0, 9, 9], vec![0, 0, 0]]).expect("rows");
    let trees = trees_of(&[left, right]);
    let graph = build_inclusion_graph(&trees).expect("two trees");
    assert_eq!(graph.vertex_count(), 3);
    assert_eq!(graph.graph_to_tree(0), [Some(0), Some(1), None]);
    assert_eq!(graph.graph_to_tree(1), [Some(0), None, Some(1)]);
    assert!(graph.parents(1).contains(&InclusionGraph::ROOT));
    assert!(graph.parents(2).contains(&InclusionGraph::ROOT));
}

#[test]
fn fusing_nothing_is_rejected() {
    let trees: Vec<(ComponentTree<u8>, NodeMap)> = Vec::new();
    let err = build_inclusion_graph(&trees).expect_err("no trees");
    assert_eq!(err, MtosError::NoChannels);
}

#[test]
fn node_maps_must_share_a_domain() {
    let small = Image2d::new(Domain::new(2, 2), 0_u8);
    let large = Image2d::new(Domain::new(2, 3), 0_u8);
    let trees = trees_of(&[small, large]);
    let err = build_inclusion_graph(&trees).expect_err("mismatched domains");
    assert!(matches!(err, MtosError::DomainMismatch { channel: 1, .. }));
}

#[test]
fn node_map_skipping_a_level_breaks_the_round_trip() {
    // Node 1 of the chain owns no pixel, so its only pixel set is node 2's and
    // the trip through the second tree comes back at node 2.
    let chain = ComponentTree::from_parts(vec![0, 0, 1], vec![0_u8, 1, 2]);
    let chain_map = Image2d::from_vec(Domain::new(1, 2), vec![2, 0]).expect("two pixels");
    let pair = ComponentTree::from_parts(vec![0, 0], vec![0_u8, 1]);
    let pair_map = Image2d::from_vec(Domain::new(1, 2), vec![1, 0]).expect("two pixels");
    let err = build_inclusion_graph(&[(chain, chain_map), (pair, pair_map)])
        .expect_err("inconsistent node map");
    assert_eq!(
        err,
        MtosError::SesRoundTrip {
            tree: 0,
            node: 1,
            other: 1,
            returned: 2,
        }
    );
    assert_eq!(err.category(), crate::ErrorCategory::InvariantViolation);
}

fn channels() -> impl Strategy<Value = Vec<Image2d<u8>>> {
    (1_usize..5, 1_usize..5, 1_usize..4).prop_flat_map(|(height, width, count)| {
        let channel = proptest::collection::vec(0_u8..4, height * width).prop_map(move |data| {
            Image2d::from_vec(Domain::new(height, width), data).expect("sized buffer")
        });
        proptest::collection::vec(channel, count)
    })
}

proptest! {
    #[test]
    fn every_vertex_is_one_distinct_shape(channels in channels()) {
        let trees = trees_of(&channels);
        let graph = build_inclusion_graph(&trees).expect("valid trees");

        let mut shapes: HashMap<VertexId, BTreeSet<usize>> = HashMap::new();
        for (i, (tree, node_map)) in trees.iter().enumerate() {
            for (node, set) in pixel_sets(tree, node_map).into_iter().enumerate() {
                let vertex = graph.tree_to_graph(i)[node];
                match shapes.entry(vertex) {
                    Entry::Occupied(known) => prop_assert_eq!(known.get(), &set),
                    Entry::Vacant(slot) => {
                        slot.insert(set);
                    }
                }
            }
        }
        prop_assert_eq!(shapes.len(), graph.vertex_count());
        let distinct: BTreeSet<_> = shapes.values().collect();
        prop_assert_eq!(distinct.len(), graph.vertex_count());
    }

    #[test]
    fn edges_point_to_strict_supersets(channels in channels()) {
        let trees = trees_of(&channels);
        let graph = build_inclusion_graph(&trees).expect("valid trees");
        let mut shapes = vec![BTreeSet::new(); graph.vertex_count()];
        for (i, (tree, node_map)) in trees.iter().enumerate() {
            for (node, set) in pixel_sets(tree, node_map).into_iter().enumerate() {
                shapes[graph.tree_to_graph(i)[node]] = set;
            }
        }
        for vertex in 1..graph.vertex_count() {
            prop_assert!(!graph.parents(vertex).is_empty());
            for &parent in graph.parents(vertex) {
                prop_assert!(shapes[parent].is_superset(&shapes[vertex]));
                prop_assert_ne!(&shapes[parent], &shapes[vertex]);
            }
        }
    }
}
