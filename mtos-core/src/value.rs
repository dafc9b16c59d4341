//! Value-type capabilities required by the tree builders.

use std::fmt::Debug;

/// A quantized channel value usable as a hierarchical-queue key.
///
/// Implemented for `u8` (256 levels) and `u16` (65 536 levels).
pub trait Level: Copy + Ord + Debug + Send + Sync + 'static {
    /// Number of distinct levels.
    const LEVELS: usize;

    /// Position of the value in `0..LEVELS`.
    fn index(self) -> usize;

    /// Inverse of [`Level::index`]. `index` must be below `LEVELS`.
    fn from_index(index: usize) -> Self;
}

impl Level for u8 {
    const LEVELS: usize = 1 << 8;

    fn index(self) -> usize {
        usize::from(self)
    }

    fn from_index(index: usize) -> Self {
        Self::try_from(index).unwrap_or(Self::MAX)
    }
}

impl Level for u16 {
    const LEVELS: usize = 1 << 16;

    fn index(self) -> usize {
        usize::from(self)
    }

    fn from_index(index: usize) -> Self {
        Self::try_from(index).unwrap_or(Self::MAX)
    }
}

/// Integer type holding per-pixel depths of the fused hierarchy.
///
/// `u16` is the default width; `u32` is available for very deep graphs.
pub trait DepthValue: Copy + Ord + Debug + Default + Send + Sync + TryFrom<usize> + 'static {
    /// Largest representable depth.
    const MAX_DEPTH: usize;
}

impl DepthValue for u16 {
    const MAX_DEPTH: usize = Self::MAX as usize;
}

impl DepthValue for u32 {
    const MAX_DEPTH: usize = Self::MAX as usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_index_round_trips_at_the_extremes() {
        assert_eq!(u8::from_index(u8::MAX.index()), u8::MAX);
        assert_eq!(u16::from_index(0), 0);
        assert_eq!(u16::MAX.index() + 1, u16::LEVELS);
    }
}
