//! Max-tree and tree-of-shapes checks through the public API.

use mtos_core::{
    Connectivity, Count, FilterPolicy, Image2d, MtosError, Point, build_maxtree, build_tos,
};
use rstest::{fixture, rstest};

#[fixture]
fn staircase() -> Image2d<u8> {
    Image2d::from_rows(vec![vec![5, 5, 3], vec![5, 5, 3], vec![1, 1, 1]]).expect("rectangular rows")
}

#[rstest]
fn staircase_nests_brighter_plateaus(staircase: Image2d<u8>) {
    let (tree, node_map) = build_maxtree(&staircase, Connectivity::C4).expect("non-empty");
    assert_eq!(tree.parents(), [0, 0, 1]);
    assert_eq!(tree.values(), [1, 3, 5]);
    assert_eq!(node_map.as_slice(), [2, 2, 1, 2, 2, 1, 0, 0, 0]);
    assert_eq!(tree.reconstruct(&node_map), staircase);
}

#[rstest]
fn staircase_areas_and_area_opening(staircase: Image2d<u8>) {
    let (tree, node_map) = build_maxtree(&staircase, Connectivity::C4).expect("non-empty");
    let area = tree
        .compute_attribute_on_points(&node_map, Count::default())
        .expect("non-empty map");
    assert_eq!(area, [9, 6, 4]);

    let (opened, opened_map) = tree
        .filter(FilterPolicy::Direct, &node_map, |node| area[node] >= 5)
        .expect("root passes");
    assert_eq!(opened.values(), [1, 3]);
    assert_eq!(
        opened.reconstruct(&opened_map).as_slice(),
        [3, 3, 3, 3, 3, 3, 1, 1, 1]
    );
}

#[rstest]
fn tos_node_map_covers_the_interpolated_grid(staircase: Image2d<u8>) {
    let (tree, node_map) = build_tos(&staircase, Point::new(2, 0)).expect("start inside");
    assert_eq!(node_map.domain().height, 5);
    assert_eq!(node_map.domain().width, 5);
    assert_eq!(*tree.value(0), 1);
    assert_eq!(tree.reconstruct(&node_map).subsample(2), staircase);
}

#[rstest]
#[case::row(Point::new(3, 0))]
#[case::column(Point::new(0, 3))]
fn tos_rejects_start_outside_the_image(staircase: Image2d<u8>, #[case] start: Point) {
    let err = build_tos(&staircase, start).expect_err("start outside");
    assert!(matches!(err, MtosError::StartOutOfDomain { .. }));
}
