//! Core orchestration for the MToS pipeline.
//!
//! Provides the [`Mtos`] runtime entry point, which sequences per-channel
//! trees of shapes, their fusion into an inclusion graph, the depth map and
//! the final saturated tree.

use tracing::{debug, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    builder::{ExecutionStrategy, MtosBuilder},
    depth_map::compute_depth_map,
    error::{MtosError, Result},
    fusion::{InclusionGraph, build_inclusion_graph},
    image::{Domain, Image2d, Point, border_median},
    saturated::build_saturated_tree,
    tos::build_tos,
    tree::{ComponentTree, NodeMap, ensure_same_domain},
    value::{DepthValue, Level},
};

/// Entry point for running the MToS pipeline.
///
/// # Examples
/// ```
/// use mtos_core::{Image2d, MtosBuilder};
///
/// let red = Image2d::from_rows(vec![vec![0_u8, 9, 0], vec![0, 9, 0]])?;
/// let blue = Image2d::from_rows(vec![vec![0_u8, 0, 0], vec![0, 9, 9]])?;
/// let mtos = MtosBuilder::new().build()?;
/// let output = mtos.run(&[red, blue])?;
/// assert_eq!(output.channel_node_counts(), [3, 2]);
/// assert_eq!(output.graph().vertex_count(), 4);
/// assert_eq!(output.pixel_node_map().domain(), output.input_domain());
/// # Ok::<(), mtos_core::MtosError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Mtos {
    start: Option<Point>,
    border_padding: bool,
    execution_strategy: ExecutionStrategy,
}

/// Everything produced by one pipeline run.
///
/// Node maps and the depth map cover the interpolated grid of the image the
/// trees were built on, which includes the padding frame when enabled.
#[derive(Debug, Clone)]
pub struct MtosOutput<D = u16> {
    tree: ComponentTree<D>,
    node_map: NodeMap,
    depth_map: Image2d<D>,
    graph: InclusionGraph,
    channel_node_counts: Vec<usize>,
    input_domain: Domain,
    border: usize,
}

impl<D> MtosOutput<D> {
    /// The saturated tree; node values are fused depths.
    #[must_use]
    pub fn tree(&self) -> &ComponentTree<D> {
        &self.tree
    }

    /// Node of every face of the interpolated grid.
    #[must_use]
    pub fn node_map(&self) -> &NodeMap {
        &self.node_map
    }

    /// Fused depth of every face of the interpolated grid.
    #[must_use]
    pub fn depth_map(&self) -> &Image2d<D> {
        &self.depth_map
    }

    /// The inclusion graph the depth map was derived from.
    #[must_use]
    pub fn graph(&self) -> &InclusionGraph {
        &self.graph
    }

    /// Number of nodes of every per-channel tree of shapes.
    #[must_use]
    pub fn channel_node_counts(&self) -> &[usize] {
        &self.channel_node_counts
    }

    /// Domain of the input channels, before padding.
    #[must_use]
    pub fn input_domain(&self) -> Domain {
        self.input_domain
    }

    /// Projects the node map back onto the input pixel grid, dropping the
    /// in-between faces and the padding frame.
    #[must_use]
    pub fn pixel_node_map(&self) -> NodeMap {
        let pixels = self.node_map.subsample(2);
        if self.border == 0 {
            return pixels;
        }
        pixels.crop(Point::new(self.border, self.border), self.input_domain)
    }

    /// Splits the output into its tree and node map.
    #[must_use]
    pub fn into_tree(self) -> (ComponentTree<D>, NodeMap) {
        (self.tree, self.node_map)
    }
}

impl Mtos {
    pub(crate) fn new(
        start: Option<Point>,
        border_padding: bool,
        execution_strategy: ExecutionStrategy,
    ) -> Self {
        Self {
            start,
            border_padding,
            execution_strategy,
        }
    }

    /// Returns the configured propagation start, in input coordinates.
    #[must_use]
    pub fn start(&self) -> Option<Point> {
        self.start
    }

    /// Returns whether channels are padded with their median border colour.
    #[must_use]
    pub fn border_padding(&self) -> bool {
        self.border_padding
    }

    /// Returns the execution strategy that will be used when running.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Runs the pipeline with 16-bit depths.
    ///
    /// # Errors
    /// See [`Mtos::run_with_depth`].
    pub fn run<V: Level>(&self, channels: &[Image2d<V>]) -> Result<MtosOutput> {
        self.run_with_depth::<V, u16>(channels)
    }

    /// Runs the pipeline, storing fused depths as `D`.
    ///
    /// # Errors
    /// Returns [`MtosError::NoChannels`], [`MtosError::EmptyDomain`],
    /// [`MtosError::DomainMismatch`] or [`MtosError::StartOutOfDomain`] for
    /// invalid input, checked before any tree is built, and
    /// [`MtosError::DepthOverflow`] when the fused hierarchy is deeper than
    /// `D` can hold.
    #[instrument(
        name = "mtos.run",
        err,
        skip(self, channels),
        fields(
            channels = channels.len(),
            padding = self.border_padding,
            strategy = ?self.execution_strategy
        ),
    )]
    pub fn run_with_depth<V, D>(&self, channels: &[Image2d<V>]) -> Result<MtosOutput<D>>
    where
        V: Level,
        D: DepthValue,
    {
        let input_domain = validate(channels, self.start)?;
        let border = usize::from(self.border_padding);
        let start = self
            .start
            .map_or(Point::new(0, 0), |start| Point::new(start.y + border, start.x + border));

        let padded;
        let channels = if self.border_padding {
            let colour = border_median(channels).ok_or(MtosError::EmptyDomain {
                domain: input_domain,
            })?;
            padded = channels
                .iter()
                .zip(colour)
                .map(|(channel, value)| channel.pad(border, value))
                .collect::<Vec<_>>();
            padded.as_slice()
        } else {
            channels
        };

        let trees = self.build_trees(channels, start)?;
        let channel_node_counts: Vec<usize> =
            trees.iter().map(|(tree, _)| tree.node_count()).collect();
        debug!(?channel_node_counts, "per-channel trees built");

        let graph = build_inclusion_graph(&trees)?;
        let depth_map = compute_depth_map::<D, V>(&graph, &trees)?;
        let (tree, node_map) = build_saturated_tree(&depth_map)?;
        debug!(
            vertices = graph.vertex_count(),
            nodes = tree.node_count(),
            "pipeline completed"
        );

        Ok(MtosOutput {
            tree,
            node_map,
            depth_map,
            graph,
            channel_node_counts,
            input_domain,
            border,
        })
    }

    fn build_trees<V: Level>(
        &self,
        channels: &[Image2d<V>],
        start: Point,
    ) -> Result<Vec<(ComponentTree<V>, NodeMap)>> {
        match self.execution_strategy {
            #[cfg(feature = "parallel")]
            ExecutionStrategy::Auto | ExecutionStrategy::Parallel => channels
                .par_iter()
                .map(|channel| build_tos(channel, start))
                .collect(),
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Auto => build_sequential(channels, start),
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Parallel => Err(MtosError::BackendUnavailable {
                requested: ExecutionStrategy::Parallel,
            }),
            ExecutionStrategy::Sequential => build_sequential(channels, start),
        }
    }
}

fn build_sequential<V: Level>(
    channels: &[Image2d<V>],
    start: Point,
) -> Result<Vec<(ComponentTree<V>, NodeMap)>> {
    channels
        .iter()
        .map(|channel| build_tos(channel, start))
        .collect()
}

fn validate<V>(channels: &[Image2d<V>], start: Option<Point>) -> Result<Domain> {
    let Some(first) = channels.first() else {
        warn!("no channel supplied, returning error");
        return Err(MtosError::NoChannels);
    };
    let domain = first.domain();
    domain.ensure_non_empty()?;
    for (channel, image) in channels.iter().enumerate().skip(1) {
        ensure_same_domain(first, image, channel)?;
    }
    if let Some(start) = start {
        if !domain.contains(start) {
            warn!(y = start.y, x = start.x, %domain, "start point outside the input");
            return Err(MtosError::StartOutOfDomain {
                y: start.y,
                x: start.x,
                domain,
            });
        }
    }
    Ok(domain)
}

/// Builds the multivariate tree of shapes of `channels`, propagating from
/// `start` without padding.
///
/// The node map covers the interpolated grid; subsample it by 2 to get one
/// node per input pixel.
///
/// # Errors
/// Same as [`Mtos::run_with_depth`].
///
/// # Examples
/// ```
/// use mtos_core::{Image2d, Point, build_mtos};
///
/// let grey = Image2d::from_rows(vec![vec![0_u8, 0, 0], vec![0, 7, 0], vec![0, 0, 0]])?;
/// let (tree, node_map) = build_mtos(&[grey], Point::new(0, 0))?;
/// assert_eq!(tree.values(), [0, 1]);
/// assert_eq!(node_map.subsample(2)[4], 1);
/// # Ok::<(), mtos_core::MtosError>(())
/// ```
pub fn build_mtos<V: Level>(
    channels: &[Image2d<V>],
    start: Point,
) -> Result<(ComponentTree<u16>, NodeMap)> {
    let output = MtosBuilder::new().with_start(start).build()?.run(channels)?;
    Ok(output.into_tree())
}
