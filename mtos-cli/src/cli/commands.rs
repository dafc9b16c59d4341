//! Command implementations and argument parsing for the `mtos` binary.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use image::{ImageBuffer, ImageError, Luma, Rgb, RgbImage};
use mtos_core::{
    ComponentTree, Count, Domain, ExecutionStrategy, FilterPolicy, Image2d, Mean, MtosBuilder,
    MtosError, MtosOutput, NodeMap, split_channels,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_MIN_AREA: usize = 16;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "mtos", about = "Build the multivariate tree of shapes of an image.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the MToS pipeline on one image.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Image to process. Any format the `image` crate decodes; converted to
    /// 8-bit RGB.
    pub input: PathBuf,

    /// Writes the per-pixel fused depth as a 16-bit grey PNG.
    #[arg(long = "depth-map")]
    pub depth_map: Option<PathBuf>,

    /// Writes the mean-colour reconstruction of the area-filtered tree.
    #[arg(long)]
    pub reconstruction: Option<PathBuf>,

    /// Smallest shape, in pixels, kept in the reconstruction.
    #[arg(
        long = "min-area",
        default_value_t = DEFAULT_MIN_AREA,
        value_parser = clap::value_parser!(usize),
    )]
    pub min_area: usize,

    /// Skips the one-pixel frame of median border colour.
    #[arg(long = "no-padding")]
    pub no_padding: bool,

    /// Builds the per-channel trees on the calling thread.
    #[arg(long)]
    pub sequential: bool,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The input image could not be read or decoded.
    #[error("failed to load `{path}`: {source}")]
    Load {
        /// Path of the input image.
        path: PathBuf,
        /// Decoder or I/O failure.
        #[source]
        source: ImageError,
    },
    /// An output image could not be encoded or written.
    #[error("failed to write `{path}`: {source}")]
    Save {
        /// Path of the output image.
        path: PathBuf,
        /// Encoder or I/O failure.
        #[source]
        source: ImageError,
    },
    /// The image is too large to address on this platform.
    #[error("image of {width}x{height} pixels exceeds the addressable size")]
    Dimensions {
        /// Width in pixels.
        width: u64,
        /// Height in pixels.
        height: u64,
    },
    /// Core pipeline failed.
    #[error(transparent)]
    Core(#[from] MtosError),
}

/// Summarises one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Domain of the input image.
    pub domain: Domain,
    /// Node count of the tree of shapes of each colour channel.
    pub channel_node_counts: Vec<usize>,
    /// Vertices of the fused inclusion graph.
    pub vertices: usize,
    /// Nodes of the final tree.
    pub nodes: usize,
    /// Largest fused depth.
    pub max_depth: u16,
    /// Nodes surviving the area filter of the reconstruction, when one was
    /// requested.
    pub reconstruction_nodes: Option<usize>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, processing or writing fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use mtos_cli::cli::{Cli, Command, RunCommand, run_cli};
/// # use tempfile::TempDir;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let input = dir.path().join("square.png");
/// image::RgbImage::from_fn(4, 3, |x, _| image::Rgb([if x < 2 { 0 } else { 200 }, 0, 0]))
///     .save(&input)?;
/// let cli = Cli {
///     command: Command::Run(RunCommand {
///         input,
///         depth_map: None,
///         reconstruction: None,
///         min_area: 1,
///         no_padding: true,
///         sequential: true,
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.channel_node_counts, [2, 1, 1]);
/// assert_eq!(summary.max_depth, 1);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(&run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(input = %command.input.display(), padding = !command.no_padding),
)]
pub(super) fn run_command(command: &RunCommand) -> Result<ExecutionSummary, CliError> {
    let strategy = if command.sequential {
        ExecutionStrategy::Sequential
    } else {
        ExecutionStrategy::Auto
    };
    let mtos = MtosBuilder::new()
        .with_border_padding(!command.no_padding)
        .with_execution_strategy(strategy)
        .build()?;

    let image = load_rgb(&command.input)?;
    let channels = split_channels(&image);
    let output = mtos.run(&channels)?;
    let pixel_map = output.pixel_node_map();

    if let Some(path) = &command.depth_map {
        write_depth_map(path, output.tree(), &pixel_map)?;
    }
    let reconstruction_nodes = match &command.reconstruction {
        Some(path) => {
            let (filtered, filtered_map) = area_filter(&output, &pixel_map, command.min_area)?;
            write_reconstruction(path, &channels, &filtered, &filtered_map)?;
            Some(filtered.node_count())
        }
        None => None,
    };

    let summary = ExecutionSummary {
        domain: image.domain(),
        channel_node_counts: output.channel_node_counts().to_vec(),
        vertices: output.graph().vertex_count(),
        nodes: output.tree().node_count(),
        max_depth: output.tree().values().iter().copied().max().unwrap_or_default(),
        reconstruction_nodes,
    };
    info!(
        vertices = summary.vertices,
        nodes = summary.nodes,
        max_depth = summary.max_depth,
        "command completed"
    );
    Ok(summary)
}

#[instrument(name = "cli.load_image", err, fields(path = %path.display()))]
pub(super) fn load_rgb(path: &Path) -> Result<Image2d<[u8; 3]>, CliError> {
    let decoded = image::open(path)
        .map_err(|source| CliError::Load {
            path: path.to_path_buf(),
            source,
        })?
        .into_rgb8();
    let (width, height) = decoded.dimensions();
    let dimensions = || CliError::Dimensions {
        width: u64::from(width),
        height: u64::from(height),
    };
    let domain = Domain::new(
        usize::try_from(height).map_err(|_| dimensions())?,
        usize::try_from(width).map_err(|_| dimensions())?,
    );
    let pixels = decoded.pixels().map(|pixel| pixel.0).collect();
    Image2d::from_vec(domain, pixels).map_err(CliError::from)
}

/// DIRECT filter of the final tree keeping shapes of at least `min_area`
/// input pixels. The root always survives.
pub(super) fn area_filter(
    output: &MtosOutput,
    pixel_map: &NodeMap,
    min_area: usize,
) -> Result<(ComponentTree<u16>, NodeMap), CliError> {
    let tree = output.tree();
    let area = tree.compute_attribute_on_points(pixel_map, Count::default())?;
    let filtered = tree.filter(FilterPolicy::Direct, pixel_map, |node| {
        node == ComponentTree::<u16>::ROOT || area[node] >= min_area
    })?;
    Ok(filtered)
}

#[instrument(
    name = "cli.write_depth_map",
    err,
    skip(tree, pixel_map),
    fields(path = %path.display()),
)]
fn write_depth_map(
    path: &Path,
    tree: &ComponentTree<u16>,
    pixel_map: &NodeMap,
) -> Result<(), CliError> {
    let depths = tree.reconstruct(pixel_map);
    let (width, height) = output_dimensions(depths.domain())?;
    let domain = depths.domain();
    let buffer: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_fn(width, height, |x, y| Luma([depths[pixel_index(domain, x, y)]]));
    buffer.save(path).map_err(|source| CliError::Save {
        path: path.to_path_buf(),
        source,
    })
}

#[instrument(
    name = "cli.write_reconstruction",
    err,
    skip(channels, tree, node_map),
    fields(path = %path.display(), nodes = tree.node_count()),
)]
fn write_reconstruction(
    path: &Path,
    channels: &[Image2d<u8>; 3],
    tree: &ComponentTree<u16>,
    node_map: &NodeMap,
) -> Result<(), CliError> {
    let mut means = Vec::with_capacity(channels.len());
    for channel in channels {
        means.push(tree.compute_attribute_on_values(node_map, channel, Mean::default())?);
    }
    let domain = node_map.domain();
    let (width, height) = output_dimensions(domain)?;
    let buffer = RgbImage::from_fn(width, height, |x, y| {
        let node = node_map[pixel_index(domain, x, y)];
        Rgb([
            to_channel(means[0][node]),
            to_channel(means[1][node]),
            to_channel(means[2][node]),
        ])
    });
    buffer.save(path).map_err(|source| CliError::Save {
        path: path.to_path_buf(),
        source,
    })
}

fn output_dimensions(domain: Domain) -> Result<(u32, u32), CliError> {
    let too_large = || CliError::Dimensions {
        width: domain.width as u64,
        height: domain.height as u64,
    };
    Ok((
        u32::try_from(domain.width).map_err(|_| too_large())?,
        u32::try_from(domain.height).map_err(|_| too_large())?,
    ))
}

// `x < width` and `y < height` both fit in usize since the domain does.
fn pixel_index(domain: Domain, x: u32, y: u32) -> usize {
    y as usize * domain.width + x as usize
}

fn to_channel(mean: f64) -> u8 {
    mean.round().clamp(0.0, 255.0) as u8
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use std::io::Cursor;
/// # use mtos_cli::cli::{ExecutionSummary, render_summary};
/// # use mtos_core::Domain;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary {
///     domain: Domain::new(2, 3),
///     channel_node_counts: vec![3, 2, 1],
///     vertices: 5,
///     nodes: 4,
///     max_depth: 2,
///     reconstruction_nodes: None,
/// };
/// let mut buffer = Cursor::new(Vec::new());
/// render_summary(&summary, &mut buffer)?;
/// let text = String::from_utf8(buffer.into_inner())?;
/// assert!(text.starts_with("domain: 2x3\n"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "domain: {}", summary.domain)?;
    for (channel, nodes) in summary.channel_node_counts.iter().enumerate() {
        writeln!(writer, "channel {channel}: {nodes} nodes")?;
    }
    writeln!(writer, "graph vertices: {}", summary.vertices)?;
    writeln!(writer, "tree nodes: {}", summary.nodes)?;
    writeln!(writer, "max depth: {}", summary.max_depth)?;
    if let Some(nodes) = summary.reconstruction_nodes {
        writeln!(writer, "reconstruction nodes: {nodes}")?;
    }
    Ok(())
}
