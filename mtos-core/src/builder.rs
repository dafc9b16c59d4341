//! Builder utilities for configuring the MToS pipeline.
//!
//! Exposes the execution strategy selection surface and the validation
//! performed before constructing [`Mtos`] instances.

use tracing::warn;

use crate::{
    error::{MtosError, Result},
    image::Point,
    mtos::Mtos,
};

/// Indicates how [`Mtos`] schedules the per-channel tree construction.
///
/// `Auto` builds channels in parallel when the `parallel` feature is enabled
/// and on the calling thread otherwise, so it is valid in every build.
///
/// # Examples
/// ```
/// use mtos_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::default();
/// assert_eq!(strategy, ExecutionStrategy::Auto);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Let the library pick the scheduling.
    #[default]
    Auto,
    /// Build every channel on the calling thread.
    Sequential,
    /// Build channels on the rayon thread pool.
    Parallel,
}

/// Configures and constructs [`Mtos`] instances.
///
/// # Examples
/// ```
/// use mtos_core::{ExecutionStrategy, MtosBuilder, Point};
///
/// let mtos = MtosBuilder::new()
///     .with_start(Point::new(0, 2))
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(mtos.start(), Some(Point::new(0, 2)));
/// assert_eq!(mtos.execution_strategy(), ExecutionStrategy::Sequential);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MtosBuilder {
    start: Option<Point>,
    border_padding: bool,
    execution_strategy: ExecutionStrategy,
}

impl MtosBuilder {
    /// Creates a builder populated with default parameters: propagation from
    /// the top-left pixel, no padding and [`ExecutionStrategy::Auto`].
    ///
    /// # Examples
    /// ```
    /// use mtos_core::{ExecutionStrategy, MtosBuilder};
    ///
    /// let builder = MtosBuilder::new();
    /// assert_eq!(builder.start(), None);
    /// assert!(!builder.border_padding());
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pixel the tree-of-shapes propagation starts from, in input
    /// coordinates.
    #[must_use]
    pub fn with_start(mut self, start: Point) -> Self {
        self.start = Some(start);
        self
    }

    /// Returns the configured start pixel, if any.
    #[must_use]
    pub fn start(&self) -> Option<Point> {
        self.start
    }

    /// Surrounds every channel with a one-pixel frame of the median border
    /// colour before building the trees.
    ///
    /// Without an explicit start the propagation then begins in the frame,
    /// so the root is the shape touching the image border.
    ///
    /// # Examples
    /// ```
    /// use mtos_core::MtosBuilder;
    ///
    /// let builder = MtosBuilder::new().with_border_padding(true);
    /// assert!(builder.border_padding());
    /// ```
    #[must_use]
    pub fn with_border_padding(mut self, enabled: bool) -> Self {
        self.border_padding = enabled;
        self
    }

    /// Returns whether border padding is enabled.
    #[must_use]
    pub fn border_padding(&self) -> bool {
        self.border_padding
    }

    /// Sets the execution strategy to use when running the pipeline.
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Validates the configuration and constructs an [`Mtos`] instance.
    ///
    /// # Errors
    /// Returns [`MtosError::BackendUnavailable`] when
    /// [`ExecutionStrategy::Parallel`] is requested without the `parallel`
    /// feature.
    ///
    /// # Examples
    /// ```
    /// use mtos_core::MtosBuilder;
    ///
    /// let mtos = MtosBuilder::new().build().expect("configuration is valid");
    /// assert!(!mtos.border_padding());
    /// ```
    pub fn build(self) -> Result<Mtos> {
        if self.execution_strategy == ExecutionStrategy::Parallel && !cfg!(feature = "parallel") {
            warn!("parallel execution requested without the parallel feature");
            return Err(MtosError::BackendUnavailable {
                requested: ExecutionStrategy::Parallel,
            });
        }
        Ok(Mtos::new(
            self.start,
            self.border_padding,
            self.execution_strategy,
        ))
    }
}
