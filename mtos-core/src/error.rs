//! Error types for the MToS core library.
//!
//! Every failure the pipeline can report is a variant of [`MtosError`]. Each
//! variant carries a stable [`MtosErrorCode`] for logs and exit-code mapping,
//! and an [`ErrorCategory`] describing who is at fault.

use std::fmt;

use thiserror::Error;

use crate::{builder::ExecutionStrategy, image::Domain};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Broad classification of [`MtosError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorCategory {
    /// The caller supplied inputs that break an API precondition.
    PreconditionViolation,
    /// The fused hierarchy is deeper than the configured depth type can hold.
    /// Retrying with a wider depth type can succeed.
    ConfigurationOverflow,
    /// An internal invariant broke. Valid inputs never trigger this.
    InvariantViolation,
}

/// Error type produced by tree construction, fusion and filtering.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum MtosError {
    /// `build_mtos` was called without any channel.
    #[error("at least one channel is required")]
    NoChannels,
    /// The input image has no pixel.
    #[error("image domain {domain} contains no pixel")]
    EmptyDomain {
        /// The offending domain.
        domain: Domain,
    },
    /// Two channels passed to the same fusion disagree on their domain.
    #[error("channel {channel} has domain {found}, expected {expected}")]
    DomainMismatch {
        /// Index of the first channel whose domain differs from channel 0.
        channel: usize,
        /// Domain of channel 0.
        expected: Domain,
        /// Domain of the offending channel.
        found: Domain,
    },
    /// An image fed to an attribute does not cover the node map's domain.
    #[error("value image has domain {image}, but the node map covers {node_map}")]
    ValuesDomainMismatch {
        /// Domain of the node map.
        node_map: Domain,
        /// Domain of the value image.
        image: Domain,
    },
    /// A pixel buffer does not match the size of its domain.
    #[error("buffer holds {len} values but domain {domain} needs {expected}")]
    BufferLengthMismatch {
        /// Domain the buffer was meant to cover.
        domain: Domain,
        /// Number of pixels in the domain.
        expected: usize,
        /// Number of values actually supplied.
        len: usize,
    },
    /// Nested rows do not all have the width of the first row.
    #[error("row {row} holds {len} values but the first row holds {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        len: usize,
    },
    /// The propagation start point lies outside the image.
    #[error("start point ({y}, {x}) lies outside domain {domain}")]
    StartOutOfDomain {
        /// Row of the start point.
        y: usize,
        /// Column of the start point.
        x: usize,
        /// Domain of the image.
        domain: Domain,
    },
    /// A filtering predicate rejected the root node.
    #[error("the root node cannot be removed by filtering")]
    RootRemoval,
    /// The longest containment chain does not fit in the depth type.
    #[error("inclusion graph depth {depth} exceeds the depth type limit {limit}")]
    DepthOverflow {
        /// Longest-path depth found in the inclusion graph.
        depth: usize,
        /// Largest value representable by the depth type.
        limit: usize,
    },
    /// Topological sorting of the inclusion graph did not visit every vertex.
    #[error("inclusion graph contains a cycle ({visited} of {vertices} vertices sorted)")]
    CycleDetected {
        /// Number of vertices reached before the sort stalled.
        visited: usize,
        /// Total number of vertices.
        vertices: usize,
    },
    /// A smallest-enclosing-shape round trip landed below the starting node.
    #[error(
        "SES round trip from tree {tree} node {node} through tree {other} returned deeper node {returned}"
    )]
    SesRoundTrip {
        /// Tree of the starting node.
        tree: usize,
        /// Starting node.
        node: usize,
        /// Tree the round trip went through.
        other: usize,
        /// Node reached after the round trip.
        returned: usize,
    },
    /// A non-root vertex of the inclusion graph has no enclosing vertex.
    #[error("inclusion graph vertex {vertex} has no enclosing vertex")]
    MissingSink {
        /// The dangling vertex.
        vertex: usize,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
}

define_error_codes! {
    /// Stable codes describing [`MtosError`] variants.
    enum MtosErrorCode for MtosError {
        /// No channel was supplied.
        NoChannels => NoChannels => "MTOS_NO_CHANNELS",
        /// The image domain is empty.
        EmptyDomain => EmptyDomain { .. } => "MTOS_EMPTY_DOMAIN",
        /// Channels disagree on their domain.
        DomainMismatch => DomainMismatch { .. } => "MTOS_DOMAIN_MISMATCH",
        /// A value image does not cover the node map.
        ValuesDomainMismatch => ValuesDomainMismatch { .. } => "MTOS_VALUES_DOMAIN_MISMATCH",
        /// A pixel buffer does not match its domain.
        BufferLengthMismatch => BufferLengthMismatch { .. } => "MTOS_BUFFER_LENGTH_MISMATCH",
        /// Nested rows have different widths.
        RaggedRow => RaggedRow { .. } => "MTOS_RAGGED_ROW",
        /// The start point lies outside the domain.
        StartOutOfDomain => StartOutOfDomain { .. } => "MTOS_START_OUT_OF_DOMAIN",
        /// Filtering attempted to remove the root.
        RootRemoval => RootRemoval => "MTOS_ROOT_REMOVAL",
        /// The fused depth overflowed the depth type.
        DepthOverflow => DepthOverflow { .. } => "MTOS_DEPTH_OVERFLOW",
        /// The inclusion graph contains a cycle.
        CycleDetected => CycleDetected { .. } => "MTOS_CYCLE_DETECTED",
        /// A smallest-enclosing-shape round trip was inconsistent.
        SesRoundTrip => SesRoundTrip { .. } => "MTOS_SES_ROUND_TRIP",
        /// A non-root vertex has no enclosing vertex.
        MissingSink => MissingSink { .. } => "MTOS_MISSING_SINK",
        /// The requested execution strategy is unavailable.
        BackendUnavailable => BackendUnavailable { .. } => "MTOS_BACKEND_UNAVAILABLE",
    }
}

impl MtosError {
    /// Classifies the error by the kind of contract it breaks.
    ///
    /// # Examples
    /// ```
    /// use mtos_core::{ErrorCategory, MtosError};
    ///
    /// assert_eq!(MtosError::RootRemoval.category(), ErrorCategory::PreconditionViolation);
    /// let overflow = MtosError::DepthOverflow { depth: 70_000, limit: 65_535 };
    /// assert_eq!(overflow.category(), ErrorCategory::ConfigurationOverflow);
    /// ```
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NoChannels
            | Self::EmptyDomain { .. }
            | Self::DomainMismatch { .. }
            | Self::ValuesDomainMismatch { .. }
            | Self::BufferLengthMismatch { .. }
            | Self::RaggedRow { .. }
            | Self::StartOutOfDomain { .. }
            | Self::RootRemoval
            | Self::BackendUnavailable { .. } => ErrorCategory::PreconditionViolation,
            Self::DepthOverflow { .. } => ErrorCategory::ConfigurationOverflow,
            Self::CycleDetected { .. } | Self::SesRoundTrip { .. } | Self::MissingSink { .. } => {
                ErrorCategory::InvariantViolation
            }
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, MtosError>;
