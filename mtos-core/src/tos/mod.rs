//! Tree of shapes of a scalar image.
//!
//! The image is immersed into an interval-valued grid of in-between faces so
//! that upper and lower level sets nest consistently. A propagation from the
//! start face assigns every face a depth (`ord`), and the max-tree of `ord`
//! is the tree of shapes. Its nodes are numbered like any max-tree, by a
//! depth-first flooding of `ord` from the top-left face. Node maps live on
//! the interpolated grid; use [`crate::Image2d::subsample`] with step 2 to get
//! back to pixels.

mod immersion;
mod propagation;

use tracing::{debug, instrument, warn};

use crate::{
    error::{MtosError, Result},
    image::{Connectivity, Image2d, Point},
    maxtree::{canonicalize, flood, into_tree},
    tree::{ComponentTree, NodeMap},
    value::Level,
};

use self::{immersion::immerse, propagation::propagate};

/// Builds the tree of shapes of `image`, propagating from `start`.
///
/// The root is the shape containing `start`; image borders are not treated
/// specially, so choose a border pixel (or pad the image) to get the usual
/// "outside is the root" convention.
///
/// # Errors
/// Returns [`MtosError::EmptyDomain`] for an empty image and
/// [`MtosError::StartOutOfDomain`] when `start` lies outside it.
///
/// # Examples
/// ```
/// use mtos_core::{Image2d, Point, build_tos};
///
/// let image = Image2d::from_rows(vec![
///     vec![0_u8, 0, 0],
///     vec![0, 9, 0],
///     vec![0, 0, 0],
/// ])?;
/// let (tree, node_map) = build_tos(&image, Point::new(0, 0))?;
/// assert_eq!(tree.values(), [0, 9]);
/// assert_eq!(node_map.domain().height, 5);
/// assert_eq!(tree.reconstruct(&node_map.subsample(2)), image);
/// # Ok::<(), mtos_core::MtosError>(())
/// ```
#[instrument(
    name = "mtos.tos",
    level = "debug",
    err,
    skip(image),
    fields(domain = %image.domain())
)]
pub fn build_tos<V: Level>(
    image: &Image2d<V>,
    start: Point,
) -> Result<(ComponentTree<V>, NodeMap)> {
    let domain = image.domain();
    domain.ensure_non_empty()?;
    if !domain.contains(start) {
        warn!(y = start.y, x = start.x, "propagation start outside the image");
        return Err(MtosError::StartOutOfDomain {
            y: start.y,
            x: start.x,
            domain,
        });
    }

    let immersion = immerse(image);
    let grid = immersion.domain();
    let start_face = grid.index_of(Point::new(2 * start.y, 2 * start.x));
    let propagation = propagate(&immersion, start_face);

    let mut parent = flood(grid, Connectivity::C4, &propagation.order);
    canonicalize(&propagation.ord, &mut parent, &propagation.order);
    let depth_to_level = &propagation.depth_to_level;
    let (tree, node_map) = into_tree(
        grid,
        Connectivity::C4,
        &propagation.ord,
        &parent,
        start_face,
        |&depth| depth_to_level[depth],
    );
    debug!(
        nodes = tree.node_count(),
        levels = depth_to_level.len(),
        "tree of shapes built"
    );
    Ok((tree, node_map))
}
