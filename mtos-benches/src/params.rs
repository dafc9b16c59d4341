//! Benchmark parameter types.

use std::fmt;

/// Parameters of a synthetic image benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct ImageBenchParams {
    /// Side length of the square image.
    pub side: usize,
    /// Number of distinct grey levels per channel.
    pub levels: usize,
}

impl fmt::Display for ImageBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{0}x{0},levels={1}", self.side, self.levels)
    }
}
