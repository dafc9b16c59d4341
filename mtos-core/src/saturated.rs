//! Saturated max-tree of a fused depth map.

use tracing::{debug, instrument};

use crate::{
    error::Result,
    image::{Connectivity, Image2d},
    maxtree::build_maxtree,
    tree::{ComponentTree, NodeMap},
    value::DepthValue,
};

/// Builds the single hierarchy refining every fused tree.
///
/// This is the 4-connected max-tree of `depth_map`; node values are depths.
///
/// # Errors
/// Returns [`crate::MtosError::EmptyDomain`] for an empty depth map.
#[instrument(
    name = "mtos.satmaxtree",
    level = "debug",
    err,
    skip(depth_map),
    fields(domain = %depth_map.domain())
)]
pub fn build_saturated_tree<D: DepthValue>(
    depth_map: &Image2d<D>,
) -> Result<(ComponentTree<D>, NodeMap)> {
    let (tree, node_map) = build_maxtree(depth_map, Connectivity::C4)?;
    debug!(nodes = tree.node_count(), "saturated tree built");
    Ok((tree, node_map))
}
