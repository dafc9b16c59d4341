//! Benchmark setup error type.

use mtos_core::MtosError;

/// Errors that may occur while preparing benchmark inputs.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Building a synthetic image or running the pipeline failed.
    #[error("pipeline setup failed: {0}")]
    Core(#[from] MtosError),
    /// The requested number of grey levels does not fit an 8-bit channel.
    #[error("{levels} levels requested; expected 1 to 256")]
    InvalidLevels {
        /// Requested number of levels.
        levels: usize,
    },
}
