//! End-to-end checks of the MToS pipeline on a small colour image.

use mtos_core::{
    Domain, ExecutionStrategy, Image2d, MtosBuilder, MtosOutput, Point, build_mtos, build_tos,
    split_channels, vertex_depths,
};
use rstest::{fixture, rstest};

const RED: [u8; 3] = [255, 75, 0];
const ORANGE: [u8; 3] = [255, 146, 0];
const GREEN: [u8; 3] = [31, 174, 0];
const BLUE: [u8; 3] = [45, 0, 255];
const BLACK: [u8; 3] = [3, 0, 0];
const WHITE: [u8; 3] = [255, 255, 255];

#[fixture]
fn colour_image() -> Image2d<[u8; 3]> {
    Image2d::from_rows(vec![
        vec![ORANGE, GREEN, BLUE, RED, GREEN],
        vec![BLUE, RED, BLACK, BLUE, WHITE],
        vec![BLACK, GREEN, RED, GREEN, RED],
        vec![GREEN, WHITE, BLUE, BLACK, BLUE],
        vec![RED, GREEN, RED, GREEN, ORANGE],
    ])
    .expect("rectangular rows")
}

fn run(image: &Image2d<[u8; 3]>, strategy: ExecutionStrategy) -> MtosOutput {
    MtosBuilder::new()
        .with_execution_strategy(strategy)
        .build()
        .expect("portable strategy")
        .run(&split_channels(image))
        .expect("valid channels")
}

fn rows<T: Copy>(image: &Image2d<T>) -> Vec<Vec<T>> {
    let width = image.domain().width;
    image.as_slice().chunks(width).map(<[T]>::to_vec).collect()
}

#[rstest]
#[case::sequential(ExecutionStrategy::Sequential)]
#[case::auto(ExecutionStrategy::Auto)]
fn colour_image_inclusion_graph(
    colour_image: Image2d<[u8; 3]>,
    #[case] strategy: ExecutionStrategy,
) {
    let output = run(&colour_image, strategy);
    assert_eq!(output.channel_node_counts(), [14, 14, 6]);

    let graph = output.graph();
    assert_eq!(graph.vertex_count(), 31);
    assert_eq!(graph.tree_count(), 3);
    assert_eq!(graph.tree_to_graph(0), [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13]);
    assert_eq!(
        graph.tree_to_graph(1),
        [0, 2, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25]
    );
    assert_eq!(graph.tree_to_graph(2), [0, 26, 27, 28, 29, 30]);

    let expected_parents: [&[usize]; 31] = [
        &[],
        &[0],
        &[0, 1],
        &[0, 1, 14],
        &[0, 1, 20],
        &[0, 1, 24],
        &[0, 1, 14],
        &[0, 1, 14],
        &[0, 7, 19],
        &[0, 1, 22],
        &[0, 14],
        &[0, 10, 14],
        &[0, 11, 15],
        &[0, 16],
        &[0],
        &[0, 10, 14],
        &[0, 14],
        &[0, 16, 29],
        &[0, 16],
        &[0, 1, 14],
        &[0, 1, 14],
        &[0, 7, 14],
        &[0, 1, 14],
        &[0, 7, 22],
        &[0, 1, 14],
        &[6, 24, 28],
        &[0, 10, 15],
        &[0, 1, 20],
        &[0, 1, 14],
        &[0, 14],
        &[0, 1, 19],
    ];
    for (vertex, expected) in expected_parents.iter().enumerate() {
        let parents: Vec<usize> = graph.parents(vertex).iter().copied().collect();
        assert_eq!(&parents, expected, "parents of vertex {vertex}");
    }

    assert_eq!(
        vertex_depths(graph).expect("acyclic graph"),
        [
            0, 1, 2, 2, 3, 3, 2, 2, 3, 3, 2, 3, 4, 3, 1, 3, 2, 3, 3, 2, 2, 3, 2, 3, 2, 3, 4, 3, 2,
            2, 3
        ]
    );
}

#[rstest]
fn colour_image_channel_trees(colour_image: Image2d<[u8; 3]>) {
    let channels = split_channels(&colour_image);
    let (red, _) = build_tos(&channels[0], Point::new(0, 0)).expect("valid start");
    assert_eq!(red.parents(), [0, 0, 1, 1, 1, 1, 1, 1, 7, 1, 0, 10, 11, 0]);
    assert_eq!(
        red.values(),
        [255, 45, 31, 255, 3, 31, 255, 31, 3, 255, 45, 31, 3, 31]
    );
    let (green, _) = build_tos(&channels[1], Point::new(0, 0)).expect("valid start");
    assert_eq!(green.parents(), [0, 0, 0, 2, 2, 4, 4, 2, 2, 2, 2, 10, 2, 12]);
    let (blue, _) = build_tos(&channels[2], Point::new(0, 0)).expect("valid start");
    assert_eq!(blue.parents(), [0, 0, 0, 0, 0, 0]);
    assert_eq!(blue.values(), [0, 255, 255, 255, 255, 255]);
}

#[rstest]
fn colour_image_depth_map(colour_image: Image2d<[u8; 3]>) {
    let output = run(&colour_image, ExecutionStrategy::Sequential);
    assert_eq!(output.depth_map().domain(), Domain::new(9, 9));
    assert_eq!(
        rows(output.depth_map()),
        vec![
            vec![0, 0, 2, 1, 3, 1, 2, 1, 3],
            vec![0, 0, 0, 0, 2, 1, 1, 1, 2],
            vec![4, 1, 1, 1, 3, 2, 2, 2, 3],
            vec![3, 1, 1, 1, 1, 1, 1, 1, 2],
            vec![4, 3, 3, 1, 1, 1, 3, 1, 2],
            vec![3, 1, 2, 1, 1, 1, 2, 1, 1],
            vec![3, 2, 3, 2, 2, 2, 3, 2, 3],
            vec![2, 2, 2, 1, 1, 1, 2, 1, 1],
            vec![3, 2, 3, 1, 1, 1, 3, 2, 3],
        ]
    );
}

#[rstest]
fn colour_image_saturated_tree(colour_image: Image2d<[u8; 3]>) {
    let output = run(&colour_image, ExecutionStrategy::Sequential);
    let tree = output.tree();
    assert_eq!(tree.node_count(), 21);
    assert_eq!(
        tree.parents(),
        [0, 0, 1, 1, 3, 3, 3, 3, 1, 1, 9, 9, 9, 9, 9, 9, 9, 16, 16, 9, 9]
    );
    assert_eq!(
        tree.values(),
        [0, 1, 2, 2, 3, 3, 3, 3, 2, 2, 3, 3, 3, 3, 3, 3, 3, 4, 4, 3, 3]
    );
    assert_eq!(
        rows(output.node_map()),
        vec![
            vec![0, 0, 2, 1, 4, 1, 8, 1, 7],
            vec![0, 0, 0, 0, 3, 1, 1, 1, 3],
            vec![18, 1, 1, 1, 5, 3, 3, 3, 6],
            vec![16, 1, 1, 1, 1, 1, 1, 1, 3],
            vec![17, 16, 16, 1, 1, 1, 10, 1, 3],
            vec![16, 1, 9, 1, 1, 1, 9, 1, 1],
            vec![16, 9, 15, 9, 9, 9, 11, 9, 12],
            vec![9, 9, 9, 1, 1, 1, 9, 1, 1],
            vec![20, 9, 19, 1, 1, 1, 13, 9, 14],
        ]
    );

    let pixels = output.pixel_node_map();
    assert_eq!(pixels.domain(), Domain::new(5, 5));
    assert_eq!(pixels[Point::new(0, 0)], 0);
    assert_eq!(pixels[Point::new(1, 0)], 18);
    assert_eq!(pixels[Point::new(4, 4)], 14);
}

#[rstest]
fn saturated_values_reproduce_the_depth_map(colour_image: Image2d<[u8; 3]>) {
    let output = run(&colour_image, ExecutionStrategy::Sequential);
    let rebuilt = output.tree().reconstruct(output.node_map());
    assert_eq!(&rebuilt, output.depth_map());
}

#[rstest]
fn build_mtos_matches_the_default_builder(colour_image: Image2d<[u8; 3]>) {
    let channels = split_channels(&colour_image);
    let (tree, node_map) = build_mtos(&channels, Point::new(0, 0)).expect("valid channels");
    let output = run(&colour_image, ExecutionStrategy::Auto);
    assert_eq!(&tree, output.tree());
    assert_eq!(&node_map, output.node_map());
}

#[rstest]
fn padded_run_keeps_the_input_grid(colour_image: Image2d<[u8; 3]>) {
    let output = MtosBuilder::new()
        .with_border_padding(true)
        .build()
        .expect("valid config")
        .run(&split_channels(&colour_image))
        .expect("valid channels");
    assert_eq!(output.input_domain(), Domain::new(5, 5));
    assert_eq!(output.depth_map().domain(), Domain::new(13, 13));
    assert_eq!(output.pixel_node_map().domain(), Domain::new(5, 5));
    assert!(output.depth_map().iter().take(13).all(|&depth| depth == 0));
}
